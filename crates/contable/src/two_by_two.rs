//! 2x2 contingency table and its categorical skill scores.
//!
//! Layout: forecast yes/no rows by observed yes/no columns.
//!
//! |          | obs yes | obs no |
//! |----------|---------|--------|
//! | fcst yes | `fy_oy` (hit) | `fy_on` (false alarm) |
//! | fcst no  | `fn_oy` (miss) | `fn_on` (correct negative) |
//!
//! References: Wilks, *Statistical Methods in the Atmospheric Sciences*
//! (ch. 7-8); Ferro & Stephenson (2011) for EDS/SEDS/EDI/SEDI and their
//! standard errors; Mesinger (2008) for BAGSS.

use std::ops::AddAssign;

use serde::Serialize;
use tracing::warn;
use verif_stats::{is_eq, lambert_w0};

use crate::ci::{
    Interval, compute_hk_ci, compute_normal_ci, compute_proportion_ci, compute_woolf_ci,
};
use crate::error::ContableError;
use crate::table::{ContingencyTable, ratio};

const FY: usize = 0;
const FN: usize = 1;
const OY: usize = 0;
const ON: usize = 1;

/// One cell of a 2x2 table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Forecast yes, observed yes.
    FyOy,
    /// Forecast yes, observed no.
    FyOn,
    /// Forecast no, observed yes.
    FnOy,
    /// Forecast no, observed no.
    FnOn,
}

impl Cell {
    fn row_col(self) -> (usize, usize) {
        match self {
            Cell::FyOy => (FY, OY),
            Cell::FyOn => (FY, ON),
            Cell::FnOy => (FN, OY),
            Cell::FnOn => (FN, ON),
        }
    }
}

/// Fixed-size 2x2 contingency table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TwoByTwoTable {
    table: ContingencyTable,
}

impl Default for TwoByTwoTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TwoByTwoTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::from_counts(0, 0, 0, 0)
    }

    /// Creates a table from hits, false alarms, misses and correct negatives.
    pub fn from_counts(fy_oy: u64, fy_on: u64, fn_oy: u64, fn_on: u64) -> Self {
        Self {
            table: ContingencyTable::from_parts(2, 2, vec![fy_oy, fy_on, fn_oy, fn_on]),
        }
    }

    /// Underlying general table.
    pub fn as_table(&self) -> &ContingencyTable {
        &self.table
    }

    /// Always fails: a 2x2 table has a fixed shape.
    pub fn set_size(&mut self, _rows: usize, _cols: usize) -> Result<(), ContableError> {
        Err(ContableError::FixedSize { rows: 2, cols: 2 })
    }

    /// Zeros every cell.
    pub fn zero_out(&mut self) {
        self.table.zero_out();
    }

    /// Records one forecast/observation outcome.
    pub fn inc(&mut self, forecast_yes: bool, observed_yes: bool) {
        let row = if forecast_yes { FY } else { FN };
        let col = if observed_yes { OY } else { ON };
        *self.table.at_mut(row, col) += 1;
    }

    /// Sets the count of one cell.
    pub fn set(&mut self, cell: Cell, value: u64) {
        let (r, c) = cell.row_col();
        *self.table.at_mut(r, c) = value;
    }

    /// Count in `cell`.
    pub fn get(&self, cell: Cell) -> u64 {
        let (r, c) = cell.row_col();
        self.table.at(r, c)
    }

    /// Hits.
    pub fn fy_oy(&self) -> u64 {
        self.table.at(FY, OY)
    }

    /// False alarms.
    pub fn fy_on(&self) -> u64 {
        self.table.at(FY, ON)
    }

    /// Misses.
    pub fn fn_oy(&self) -> u64 {
        self.table.at(FN, OY)
    }

    /// Correct negatives.
    pub fn fn_on(&self) -> u64 {
        self.table.at(FN, ON)
    }

    /// Forecast yes total.
    pub fn fy_total(&self) -> u64 {
        self.fy_oy() + self.fy_on()
    }

    /// Forecast no total.
    pub fn fn_total(&self) -> u64 {
        self.fn_oy() + self.fn_on()
    }

    /// Observed yes total.
    pub fn oy_total(&self) -> u64 {
        self.fy_oy() + self.fn_oy()
    }

    /// Observed no total.
    pub fn on_total(&self) -> u64 {
        self.fy_on() + self.fn_on()
    }

    /// Grand total.
    pub fn n(&self) -> u64 {
        self.table.total()
    }

    /// Cell count as a proportion of the grand total.
    pub fn total_proportion(&self, cell: Cell) -> Option<f64> {
        ratio(self.get(cell), self.n())
    }

    /// Cell count as a proportion of its forecast row.
    pub fn fcst_proportion(&self, cell: Cell) -> Option<f64> {
        let (r, _) = cell.row_col();
        ratio(self.get(cell), self.table.row_sum(r))
    }

    /// Cell count as a proportion of its observation column.
    pub fn obs_proportion(&self, cell: Cell) -> Option<f64> {
        let (_, c) = cell.row_col();
        ratio(self.get(cell), self.table.col_sum(c))
    }

    /// Forecast event rate, `fy / n`.
    pub fn f_rate(&self) -> Option<f64> {
        ratio(self.fy_total(), self.n())
    }

    /// Hit rate as a share of all pairs, `fy_oy / n`.
    pub fn h_rate(&self) -> Option<f64> {
        ratio(self.fy_oy(), self.n())
    }

    /// Observed event rate, `oy / n`.
    pub fn o_rate(&self) -> Option<f64> {
        ratio(self.oy_total(), self.n())
    }

    /// Base rate, `oy / n`.
    pub fn baser(&self) -> Option<f64> {
        self.o_rate()
    }

    /// Forecast mean, `fy / n`.
    pub fn fmean(&self) -> Option<f64> {
        self.f_rate()
    }

    /// Accuracy, `(fy_oy + fn_on) / n`.
    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.fy_oy() + self.fn_on(), self.n())
    }

    /// Frequency bias, `fy / oy`.
    pub fn fbias(&self) -> Option<f64> {
        ratio(self.fy_total(), self.oy_total())
    }

    /// Probability of detection, `fy_oy / oy`.
    pub fn pod_yes(&self) -> Option<f64> {
        ratio(self.fy_oy(), self.oy_total())
    }

    /// Probability of detecting non-events, `fn_on / on`.
    pub fn pod_no(&self) -> Option<f64> {
        ratio(self.fn_on(), self.on_total())
    }

    /// Probability of false detection, `1 - pod_no`.
    pub fn pofd(&self) -> Option<f64> {
        self.pod_no().map(|d| 1.0 - d)
    }

    /// False alarm ratio, `fy_on / fy`.
    pub fn far(&self) -> Option<f64> {
        ratio(self.fy_on(), self.fy_total())
    }

    /// Critical success index, `fy_oy / (n - fn_on)`.
    pub fn csi(&self) -> Option<f64> {
        ratio(self.fy_oy(), self.n() - self.fn_on())
    }

    /// Gilbert skill score (equitable threat score).
    pub fn gss(&self) -> Option<f64> {
        let n = self.n();
        if n == 0 {
            return None;
        }
        let (a, b, c) = (self.fy_oy() as f64, self.fy_on() as f64, self.fn_oy() as f64);
        let q = (a + b) * (a + c) / n as f64;
        let den = a + b + c - q;
        (!is_eq(den, 0.0)).then(|| (a - q) / den)
    }

    /// Bias-adjusted Gilbert skill score.
    ///
    /// Undefined if the total, observed events, misses or false alarms is zero.
    pub fn bagss(&self) -> Option<f64> {
        let (n, oy, fn_oy, fy_on) = (self.n(), self.oy_total(), self.fn_oy(), self.fy_on());
        if n == 0 || oy == 0 || fn_oy == 0 || fy_on == 0 {
            return None;
        }
        let (n, oy, fn_oy, fy_on) = (n as f64, oy as f64, fn_oy as f64, fy_on as f64);
        let lf = (oy / fn_oy).ln();
        if is_eq(lf, 0.0) {
            return None;
        }
        let Some(lw) = lambert_w0(oy / fy_on * lf) else {
            warn!(oy, fy_on, lf, "lambert W undefined for bias-adjusted GSS");
            return None;
        };
        let ha = oy - (fy_on / lf) * lw;
        let chance = oy * oy / n;
        let den = 2.0 * oy - ha - chance;
        (!is_eq(den, 0.0)).then(|| (ha - chance) / den)
    }

    /// Hanssen-Kuipers discriminant, `(ad - bc) / ((a+c)(b+d))`.
    pub fn hk(&self) -> Option<f64> {
        let (a, b, c, d) = self.cells_f64();
        let den = (a + c) * (b + d);
        (!is_eq(den, 0.0)).then(|| (a * d - b * c) / den)
    }

    /// Heidke skill score.
    pub fn hss(&self) -> Option<f64> {
        let (a, b, c, d) = self.cells_f64();
        let den = (a + c) * (c + d) + (a + b) * (b + d);
        (!is_eq(den, 0.0)).then(|| 2.0 * (a * d - b * c) / den)
    }

    /// Odds ratio from POD and POFD. Undefined when either is 1.
    pub fn odds(&self) -> Option<f64> {
        let py = self.pod_yes()?;
        let pn = self.pofd()?;
        if is_eq(py, 1.0) || is_eq(pn, 1.0) {
            return None;
        }
        let den = pn / (1.0 - pn);
        (!is_eq(den, 0.0)).then(|| (py / (1.0 - py)) / den)
    }

    /// Log odds ratio. Undefined when any cell is zero.
    pub fn lodds(&self) -> Option<f64> {
        let (a, b, c, d) = self.positive_cells()?;
        Some(a.ln() + d.ln() - b.ln() - c.ln())
    }

    /// Asymptotic variance of the log odds ratio, `Σ 1/cell`.
    pub fn slor2(&self) -> Option<f64> {
        let (a, b, c, d) = self.positive_cells()?;
        Some(1.0 / a + 1.0 / b + 1.0 / c + 1.0 / d)
    }

    /// Odds ratio skill score (Yule's Q), `(ad - bc) / (ad + bc)`.
    pub fn orss(&self) -> Option<f64> {
        let (a, b, c, d) = self.cells_f64();
        let den = a * d + b * c;
        (den != 0.0).then(|| (a * d - b * c) / den)
    }

    /// Extreme dependency score.
    pub fn eds(&self) -> Option<f64> {
        let (a, oy, n) = (self.fy_oy(), self.oy_total(), self.n());
        if a == 0 || oy == 0 || n == 0 {
            return None;
        }
        let n = n as f64;
        let den = (a as f64 / n).ln();
        (!is_eq(den, 0.0)).then(|| 2.0 * (oy as f64 / n).ln() / den - 1.0)
    }

    /// Symmetric extreme dependency score.
    pub fn seds(&self) -> Option<f64> {
        let (a, fy, oy, n) = (self.fy_oy(), self.fy_total(), self.oy_total(), self.n());
        if a == 0 || fy == 0 || oy == 0 || n == 0 {
            return None;
        }
        let n = n as f64;
        let num = (fy as f64 / n).ln() + (oy as f64 / n).ln();
        let den = (a as f64 / n).ln();
        (!is_eq(den, 0.0)).then(|| num / den - 1.0)
    }

    /// False alarm rate `fy_on / (fy_on + fn_on)`, excluding zero.
    fn positive_f(&self) -> Option<f64> {
        ratio(self.fy_on(), self.on_total()).filter(|&f| !is_eq(f, 0.0))
    }

    /// Extremal dependence index.
    pub fn edi(&self) -> Option<f64> {
        let f = self.positive_f()?;
        let h = self.pod_yes().filter(|&h| !is_eq(h, 0.0))?;
        let den = f.ln() + h.ln();
        (!is_eq(den, 0.0)).then(|| (f.ln() - h.ln()) / den)
    }

    /// Symmetric extremal dependence index. Undefined when the hit rate or
    /// false alarm rate is 0 or 1.
    pub fn sedi(&self) -> Option<f64> {
        let (f, h) = self.interior_rates()?;
        let num = f.ln() - h.ln() - (1.0 - f).ln() + (1.0 - h).ln();
        let den = f.ln() + h.ln() + (1.0 - f).ln() + (1.0 - h).ln();
        (!is_eq(den, 0.0)).then(|| num / den)
    }

    /// Relative value for a user with cost/loss ratio `r`.
    pub fn cost_loss(&self, r: f64) -> Option<f64> {
        let n = self.n();
        if n == 0 {
            return None;
        }
        let n = n as f64;
        let h = self.fy_oy() as f64 / n;
        let m = self.fn_oy() as f64 / n;
        let f = self.fy_on() as f64 / n;
        let b = self.oy_total() as f64 / n;
        let (num, den) = if r < b {
            (r * (h + f - 1.0) + m, r * (b - 1.0))
        } else {
            (r * (h + f) + m - b, b * (r - 1.0))
        };
        (!is_eq(den, 0.0)).then(|| num / den)
    }

    // --- Confidence intervals ---

    /// Wilson interval for the base rate.
    pub fn baser_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.baser(), self.n(), alpha, vif)
    }

    /// Wilson interval for the forecast mean.
    pub fn fmean_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.fmean(), self.n(), alpha, vif)
    }

    /// Wilson interval for accuracy.
    pub fn accuracy_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.accuracy(), self.n(), alpha, vif)
    }

    /// Wilson interval for POD.
    pub fn pod_yes_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.pod_yes(), self.n(), alpha, vif)
    }

    /// Wilson interval for POD of non-events.
    pub fn pod_no_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.pod_no(), self.n(), alpha, vif)
    }

    /// Wilson interval for POFD.
    pub fn pofd_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.pofd(), self.n(), alpha, vif)
    }

    /// Wilson interval for FAR.
    pub fn far_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.far(), self.n(), alpha, vif)
    }

    /// Wilson interval for CSI.
    pub fn csi_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.csi(), self.n(), alpha, vif)
    }

    /// Interval for HK.
    pub fn hk_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_hk_ci(
            self.hk(),
            alpha,
            vif,
            self.fy_oy(),
            self.fy_on(),
            self.fn_oy(),
            self.fn_on(),
        )
    }

    /// Woolf interval for the odds ratio.
    pub fn odds_ci(&self, alpha: f64) -> Option<Interval> {
        compute_woolf_ci(
            self.odds(),
            alpha,
            self.fy_oy(),
            self.fy_on(),
            self.fn_oy(),
            self.fn_on(),
        )
    }

    /// Normal interval for the log odds ratio with `se = sqrt(slor2)`.
    pub fn lodds_ci(&self, alpha: f64) -> Option<Interval> {
        compute_normal_ci(self.lodds()?, alpha, self.slor2()?.sqrt())
    }

    /// Normal interval for ORSS using the delta method on the odds ratio.
    pub fn orss_ci(&self, alpha: f64) -> Option<Interval> {
        let v = self.orss()?;
        let r = self.odds()?;
        let s = self.slor2()?;
        let se = (s * 4.0 * r * r / (r + 1.0).powi(4)).sqrt();
        compute_normal_ci(v, alpha, se)
    }

    fn base_and_hit_rate(&self) -> Option<(f64, f64)> {
        let b = self.baser().filter(|&b| !is_eq(b, 0.0))?;
        let h = self.pod_yes().filter(|&h| !is_eq(h, 0.0))?;
        Some((b, h))
    }

    /// Normal interval for EDS.
    pub fn eds_ci(&self, alpha: f64) -> Option<Interval> {
        let v = self.eds()?;
        let (b, h) = self.base_and_hit_rate()?;
        let n = self.n() as f64;
        let se = 2.0 * b.ln().abs() / (h * (b.ln() + h.ln()).powi(2))
            * (h * (1.0 - h) / (b * n)).sqrt();
        self.normal_ci_or_warn("EDS", v, alpha, se)
    }

    /// Normal interval for SEDS.
    pub fn seds_ci(&self, alpha: f64) -> Option<Interval> {
        let v = self.seds()?;
        let (b, h) = self.base_and_hit_rate()?;
        let fbias = self.fbias()?;
        let n = self.n() as f64;
        let se = (h * (1.0 - h) / (n * b)).sqrt()
            * (-(fbias * b * b).ln() / (h * (h * b).ln().powi(2)));
        self.normal_ci_or_warn("SEDS", v, alpha, se)
    }

    /// Normal interval for EDI. Undefined when the hit rate is 1.
    pub fn edi_ci(&self, alpha: f64) -> Option<Interval> {
        let v = self.edi()?;
        let f = self.positive_f()?;
        let (b, h) = self.base_and_hit_rate()?;
        if is_eq(h, 1.0) {
            return None;
        }
        let n = self.n() as f64;
        let se = 2.0 * (f.ln() + h / (1.0 - h) * h.ln()).abs() / (h * (f.ln() + h.ln()).powi(2))
            * (h * (1.0 - h) / (b * n)).sqrt();
        self.normal_ci_or_warn("EDI", v, alpha, se)
    }

    /// Normal interval for SEDI, centred on SEDI.
    pub fn sedi_ci(&self, alpha: f64) -> Option<Interval> {
        let v = self.sedi()?;
        let (f, h) = self.interior_rates()?;
        let b = self.baser()?;
        let n = self.n() as f64;
        let mf = 1.0 - f;
        let mh = 1.0 - h;
        let se = 2.0
            * ((mh * mf + h * f) / (mh * mf) * (f * mh).ln() + 2.0 * h / mh * (h * mf).ln()).abs()
            / (h * ((f * mh).ln() + (h * mf).ln()).powi(2))
            * (h * mh / (b * n)).sqrt();
        self.normal_ci_or_warn("SEDI", v, alpha, se)
    }

    fn normal_ci_or_warn(&self, stat: &str, v: f64, alpha: f64, se: f64) -> Option<Interval> {
        if !se.is_finite() {
            warn!(stat, se, "non-finite standard error");
            return None;
        }
        compute_normal_ci(v, alpha, se)
    }

    // --- helpers ---

    fn cells_f64(&self) -> (f64, f64, f64, f64) {
        (
            self.fy_oy() as f64,
            self.fy_on() as f64,
            self.fn_oy() as f64,
            self.fn_on() as f64,
        )
    }

    fn positive_cells(&self) -> Option<(f64, f64, f64, f64)> {
        if [self.fy_oy(), self.fy_on(), self.fn_oy(), self.fn_on()].contains(&0) {
            return None;
        }
        Some(self.cells_f64())
    }

    /// False alarm rate and hit rate, both strictly inside (0, 1).
    fn interior_rates(&self) -> Option<(f64, f64)> {
        let f = ratio(self.fy_on(), self.on_total())?;
        let h = self.pod_yes()?;
        let interior = |x: f64| !is_eq(x, 0.0) && !is_eq(x, 1.0);
        (interior(f) && interior(h)).then_some((f, h))
    }
}

impl AddAssign<&TwoByTwoTable> for TwoByTwoTable {
    fn add_assign(&mut self, other: &TwoByTwoTable) {
        for cell in [Cell::FyOy, Cell::FyOn, Cell::FnOy, Cell::FnOn] {
            let (r, c) = cell.row_col();
            *self.table.at_mut(r, c) += other.get(cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Finley (1884) tornado forecasts.
    fn finley() -> TwoByTwoTable {
        TwoByTwoTable::from_counts(28, 72, 23, 2680)
    }

    #[test]
    fn cell_layout() {
        let t = finley();
        assert_eq!(t.as_table().entry(0, 0).unwrap(), 28);
        assert_eq!(t.as_table().entry(0, 1).unwrap(), 72);
        assert_eq!(t.as_table().entry(1, 0).unwrap(), 23);
        assert_eq!(t.as_table().entry(1, 1).unwrap(), 2680);
        assert_eq!(t.n(), 2803);
        assert_eq!(t.fy_total(), 100);
        assert_eq!(t.oy_total(), 51);
    }

    #[test]
    fn finley_scores() {
        let t = finley();
        assert_relative_eq!(t.csi().unwrap(), 0.227642, epsilon = 1e-6);
        assert_relative_eq!(t.gss().unwrap(), 0.216046, epsilon = 1e-6);
        assert_relative_eq!(t.hss().unwrap(), 0.355325, epsilon = 1e-6);
        assert_relative_eq!(t.hk().unwrap(), 0.522857, epsilon = 1e-6);
        assert_relative_eq!(t.accuracy().unwrap(), 2708.0 / 2803.0, epsilon = 1e-12);
        assert_relative_eq!(t.fbias().unwrap(), 100.0 / 51.0, epsilon = 1e-12);
        assert_relative_eq!(t.far().unwrap(), 0.72, epsilon = 1e-12);
    }

    #[test]
    fn finley_odds_family() {
        let t = finley();
        assert_relative_eq!(t.odds().unwrap(), 45.314010, epsilon = 1e-5);
        assert_relative_eq!(t.lodds().unwrap(), 3.813616, epsilon = 1e-6);
        assert_relative_eq!(t.orss().unwrap(), 0.956817, epsilon = 1e-6);
        assert_relative_eq!(t.lodds().unwrap(), t.odds().unwrap().ln(), epsilon = 1e-10);
    }

    #[test]
    fn finley_extreme_dependency() {
        let t = finley();
        assert_relative_eq!(t.eds().unwrap(), 0.739648, epsilon = 1e-6);
        assert_relative_eq!(t.seds().unwrap(), 0.593467, epsilon = 1e-6);
        assert_relative_eq!(t.edi().unwrap(), 0.717362, epsilon = 1e-6);
        assert_relative_eq!(t.sedi().unwrap(), 0.752804, epsilon = 1e-6);
        assert_relative_eq!(t.bagss().unwrap(), 0.180880, epsilon = 1e-6);
    }

    #[test]
    fn accuracy_identity_and_pod_complement() {
        let t = TwoByTwoTable::from_counts(12, 5, 7, 40);
        assert_relative_eq!(t.accuracy().unwrap(), 52.0 / 64.0);
        let pod = t.pod_yes().unwrap();
        assert_relative_eq!(pod + (1.0 - pod), 1.0);
        assert_relative_eq!(t.pofd().unwrap(), 1.0 - t.pod_no().unwrap());
    }

    #[test]
    fn empty_table_is_all_none() {
        let t = TwoByTwoTable::new();
        assert!(t.baser().is_none());
        assert!(t.csi().is_none());
        assert!(t.gss().is_none());
        assert!(t.hk().is_none());
        assert!(t.bagss().is_none());
        assert!(t.cost_loss(0.2).is_none());
    }

    #[test]
    fn zero_cell_degeneracies() {
        // No misses: lodds and bagss undefined, csi still fine.
        let t = TwoByTwoTable::from_counts(10, 3, 0, 50);
        assert!(t.lodds().is_none());
        assert!(t.slor2().is_none());
        assert!(t.bagss().is_none());
        assert!(t.sedi().is_none()); // hit rate == 1
        assert!(t.odds().is_none());
        assert_relative_eq!(t.csi().unwrap(), 10.0 / 13.0);
    }

    #[test]
    fn cost_loss_branches() {
        let t = finley();
        // base rate ~0.0182
        assert_relative_eq!(t.cost_loss(0.1).unwrap(), 0.392157, epsilon = 1e-6);
        assert_relative_eq!(t.cost_loss(0.01).unwrap(), 0.146439, epsilon = 1e-6);
    }

    #[test]
    fn rates_and_proportions() {
        let t = finley();
        assert_relative_eq!(t.f_rate().unwrap(), 100.0 / 2803.0);
        assert_relative_eq!(t.h_rate().unwrap(), 28.0 / 2803.0);
        assert_relative_eq!(t.o_rate().unwrap(), 51.0 / 2803.0);
        assert_relative_eq!(t.fcst_proportion(Cell::FyOn).unwrap(), 0.72);
        assert_relative_eq!(t.obs_proportion(Cell::FnOy).unwrap(), 23.0 / 51.0);
        assert_relative_eq!(t.total_proportion(Cell::FnOn).unwrap(), 2680.0 / 2803.0);
    }

    #[test]
    fn set_and_inc() {
        let mut t = TwoByTwoTable::new();
        t.inc(true, true);
        t.inc(true, false);
        t.inc(false, false);
        t.inc(false, false);
        assert_eq!(t.get(Cell::FyOy), 1);
        assert_eq!(t.get(Cell::FyOn), 1);
        assert_eq!(t.get(Cell::FnOn), 2);
        t.set(Cell::FnOn, 0);
        t.set(Cell::FnOy, 5);
        assert_eq!(t.fn_on(), 0);
        assert_eq!(t.fn_oy(), 5);
        assert_eq!(t.n(), 7);
    }

    #[test]
    fn resize_is_rejected() {
        let mut t = finley();
        assert!(matches!(
            t.set_size(3, 3),
            Err(ContableError::FixedSize { rows: 2, cols: 2 })
        ));
    }

    #[test]
    fn merge() {
        let mut t = finley();
        t += &finley();
        assert_eq!(t.n(), 2 * 2803);
        assert_relative_eq!(t.csi().unwrap(), finley().csi().unwrap());
    }

    #[test]
    fn normal_intervals_bracket_point_values() {
        let t = finley();
        let checks = [
            (t.lodds().unwrap(), t.lodds_ci(0.05)),
            (t.orss().unwrap(), t.orss_ci(0.05)),
            (t.eds().unwrap(), t.eds_ci(0.05)),
            (t.seds().unwrap(), t.seds_ci(0.05)),
            (t.edi().unwrap(), t.edi_ci(0.05)),
            (t.sedi().unwrap(), t.sedi_ci(0.05)),
            (t.hk().unwrap(), t.hk_ci(0.05, 1.0)),
            (t.odds().unwrap(), t.odds_ci(0.05)),
            (t.csi().unwrap(), t.csi_ci(0.05, 1.0)),
        ];
        for (v, ci) in checks {
            let ci = ci.unwrap();
            assert!(ci.lower < v && v < ci.upper, "{v} not in {ci:?}");
        }
    }

    #[test]
    fn sedi_interval_is_centred_on_sedi() {
        let t = finley();
        let ci = t.sedi_ci(0.05).unwrap();
        assert_relative_eq!((ci.lower + ci.upper) / 2.0, t.sedi().unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn narrower_interval_at_larger_alpha() {
        let t = finley();
        let wide = t.lodds_ci(0.01).unwrap();
        let narrow = t.lodds_ci(0.2).unwrap();
        assert!(narrow.upper - narrow.lower < wide.upper - wide.lower);
    }
}
