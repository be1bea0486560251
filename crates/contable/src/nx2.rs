//! Probability-bin by event/non-event table for probabilistic forecasts.

use serde::Serialize;
use verif_stats::{is_eq, students_t_quantile};

use crate::ci::{Interval, compute_proportion_ci};
use crate::error::ContableError;
use crate::table::{ContingencyTable, ratio};
use crate::two_by_two::TwoByTwoTable;

const EVENT: usize = 0;
const NONEVENT: usize = 1;

/// N probability bins by {event, non-event}.
///
/// Bin `i` covers `[thresholds[i], thresholds[i+1])`; the top threshold
/// itself belongs to the last bin. A bin's representative probability is
/// its midpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Nx2Table {
    table: ContingencyTable,
    thresholds: Vec<f64>,
}

impl Nx2Table {
    /// Creates an empty table with `thresholds.len() - 1` bins.
    ///
    /// Thresholds must be finite and strictly increasing, with at least three
    /// values.
    pub fn new(thresholds: Vec<f64>) -> Result<Self, ContableError> {
        check_thresholds(&thresholds)?;
        let rows = thresholds.len() - 1;
        Ok(Self {
            table: ContingencyTable::new(rows, 2)?,
            thresholds,
        })
    }

    /// Evenly spaced bins over `[0, 1]`.
    pub fn uniform(n_bins: usize) -> Result<Self, ContableError> {
        let thresholds = (0..=n_bins).map(|i| i as f64 / n_bins as f64).collect();
        Self::new(thresholds)
    }

    /// Replaces the bin thresholds, keeping the counts.
    pub fn set_thresholds(&mut self, thresholds: Vec<f64>) -> Result<(), ContableError> {
        check_thresholds(&thresholds)?;
        if thresholds.len() != self.n_rows() + 1 {
            return Err(ContableError::InvalidThresholds {
                reason: format!(
                    "expected {} thresholds for {} bins, got {}",
                    self.n_rows() + 1,
                    self.n_rows(),
                    thresholds.len()
                ),
            });
        }
        self.thresholds = thresholds;
        Ok(())
    }

    /// Underlying general table.
    pub fn as_table(&self) -> &ContingencyTable {
        &self.table
    }

    /// Number of probability bins.
    pub fn n_rows(&self) -> usize {
        self.table.rows()
    }

    /// Bin thresholds (`n_rows() + 1` values).
    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Threshold `k` in `0..=n_rows()`.
    pub fn threshold(&self, k: usize) -> Result<f64, ContableError> {
        self.thresholds
            .get(k)
            .copied()
            .ok_or(ContableError::OutOfRange {
                row: k,
                col: 0,
                rows: self.thresholds.len(),
                cols: 1,
            })
    }

    /// Maps a probability value to its bin.
    pub fn value_to_row(&self, t: f64) -> Result<usize, ContableError> {
        let n = self.n_rows();
        let lo = self.thresholds[0];
        let hi = self.thresholds[n];
        let out_of_range = ContableError::ValueOutOfRange { value: t, lo, hi };
        if t.is_nan() || (t < lo && !is_eq(t, lo)) || (t > hi && !is_eq(t, hi)) {
            return Err(out_of_range);
        }
        for j in 0..n {
            let above = t > self.thresholds[j] || is_eq(t, self.thresholds[j]);
            let below = t < self.thresholds[j + 1] && !is_eq(t, self.thresholds[j + 1]);
            if above && below {
                return Ok(j);
            }
        }
        if is_eq(t, hi) {
            return Ok(n - 1);
        }
        Err(out_of_range)
    }

    /// Counts one event forecast with probability `t`.
    pub fn inc_event(&mut self, t: f64) -> Result<(), ContableError> {
        let r = self.value_to_row(t)?;
        self.table.inc_entry(r, EVENT)
    }

    /// Counts one non-event forecast with probability `t`.
    pub fn inc_nonevent(&mut self, t: f64) -> Result<(), ContableError> {
        let r = self.value_to_row(t)?;
        self.table.inc_entry(r, NONEVENT)
    }

    /// Sets the event and non-event counts of one bin.
    pub fn set_row(&mut self, row: usize, events: u64, nonevents: u64) -> Result<(), ContableError> {
        self.table.set_entry(row, EVENT, events)?;
        self.table.set_entry(row, NONEVENT, nonevents)
    }

    /// Merges counts from a table with identical bins.
    pub fn try_add(&mut self, other: &Nx2Table) -> Result<(), ContableError> {
        if self.thresholds.len() != other.thresholds.len()
            || self
                .thresholds
                .iter()
                .zip(&other.thresholds)
                .any(|(a, b)| !is_eq(*a, *b))
        {
            return Err(ContableError::InvalidThresholds {
                reason: "cannot merge tables with different bins".to_string(),
            });
        }
        self.table.try_add(&other.table)
    }

    fn check_row(&self, row: usize) -> Result<(), ContableError> {
        if row >= self.n_rows() {
            return Err(ContableError::OutOfRange {
                row,
                col: 0,
                rows: self.n_rows(),
                cols: 2,
            });
        }
        Ok(())
    }

    fn events(&self, row: usize) -> u64 {
        self.table.at(row, EVENT)
    }

    fn nonevents(&self, row: usize) -> u64 {
        self.table.at(row, NONEVENT)
    }

    fn proby(&self, row: usize) -> f64 {
        0.5 * (self.thresholds[row] + self.thresholds[row + 1])
    }

    /// Events in bin `row`.
    pub fn event_count_by_row(&self, row: usize) -> Result<u64, ContableError> {
        self.table.entry(row, EVENT)
    }

    /// Non-events in bin `row`.
    pub fn nonevent_count_by_row(&self, row: usize) -> Result<u64, ContableError> {
        self.table.entry(row, NONEVENT)
    }

    /// Total events.
    pub fn event_total(&self) -> u64 {
        self.table.col_sum(EVENT)
    }

    /// Total non-events.
    pub fn nonevent_total(&self) -> u64 {
        self.table.col_sum(NONEVENT)
    }

    /// Total count.
    pub fn n(&self) -> u64 {
        self.table.total()
    }

    /// Representative probability (midpoint) of bin `row`.
    pub fn row_proby(&self, row: usize) -> Result<f64, ContableError> {
        self.check_row(row)?;
        Ok(self.proby(row))
    }

    /// Observed event frequency within bin `row`.
    pub fn row_obar(&self, row: usize) -> Result<Option<f64>, ContableError> {
        self.check_row(row)?;
        Ok(ratio(self.events(row), self.table.row_sum(row)))
    }

    /// Overall observed event frequency.
    pub fn obar(&self) -> Option<f64> {
        ratio(self.event_total(), self.n())
    }

    /// Base rate (same as [`Nx2Table::obar`]).
    pub fn baser(&self) -> Option<f64> {
        self.obar()
    }

    /// Wilson interval for the base rate.
    pub fn baser_ci(&self, alpha: f64, vif: f64) -> Option<Interval> {
        compute_proportion_ci(self.baser(), self.n(), alpha, vif)
    }

    /// Reliability, `(1/N) Σ Nᵢ (yᵢ - ōᵢ)²` over bins with data.
    pub fn reliability(&self) -> Option<f64> {
        let n = self.n();
        if n == 0 {
            return None;
        }
        let sum: f64 = (0..self.n_rows())
            .filter_map(|r| {
                let ni = self.table.row_sum(r);
                let obari = ratio(self.events(r), ni)?;
                let t = self.proby(r) - obari;
                Some(ni as f64 * t * t)
            })
            .sum();
        Some(sum / n as f64)
    }

    /// Resolution, `(1/N) Σ Nᵢ (ōᵢ - ō)²` over bins with data.
    pub fn resolution(&self) -> Option<f64> {
        let n = self.n();
        let obar = self.obar()?;
        let sum: f64 = (0..self.n_rows())
            .filter_map(|r| {
                let ni = self.table.row_sum(r);
                let obari = ratio(self.events(r), ni)?;
                let t = obari - obar;
                Some(ni as f64 * t * t)
            })
            .sum();
        Some(sum / n as f64)
    }

    /// Uncertainty, `ō(1 - ō)`.
    pub fn uncertainty(&self) -> Option<f64> {
        self.obar().map(|o| o * (1.0 - o))
    }

    /// Sample Brier skill score, `(resolution - reliability) / uncertainty`.
    pub fn bss_smpl(&self) -> Option<f64> {
        let res = self.resolution()?;
        let rel = self.reliability()?;
        let unc = self.uncertainty().filter(|&u| !is_eq(u, 0.0))?;
        Some((res - rel) / unc)
    }

    /// Brier score using bin midpoints as the forecast probabilities.
    pub fn brier_score(&self) -> Option<f64> {
        let n = self.n();
        if n == 0 {
            return None;
        }
        let sum: f64 = (0..self.n_rows())
            .map(|r| {
                let y = self.proby(r);
                self.events(r) as f64 * (y - 1.0).powi(2) + self.nonevents(r) as f64 * y * y
            })
            .sum();
        Some(sum / n as f64)
    }

    /// Half-width of the Brier score confidence interval.
    ///
    /// Sampling variance from Bradley, Schwartz and Hashino (2008):
    /// `Var(BS) = (E[(y - x)⁴] - BS²) / N`, with a Student-t critical value
    /// on N-1 degrees of freedom. Undefined for N <= 1.
    pub fn brier_ci_halfwidth(&self, alpha: f64) -> Option<f64> {
        let n = self.n();
        if n <= 1 || !(alpha > 0.0 && alpha < 1.0) {
            return None;
        }
        let bs = self.brier_score()?;
        let nf = n as f64;
        let t = students_t_quantile(1.0 - 0.5 * alpha, nf - 1.0)?;
        let m4: f64 = (0..self.n_rows())
            .map(|r| {
                let y = self.proby(r);
                self.events(r) as f64 * (y - 1.0).powi(4) + self.nonevents(r) as f64 * y.powi(4)
            })
            .sum::<f64>()
            / nf;
        let var = (m4 - bs * bs) / nf;
        if var < 0.0 {
            return None;
        }
        Some(t * var.sqrt())
    }

    /// Observed event frequency in bin `row` (calibration-refinement view).
    pub fn row_calibration(&self, row: usize) -> Result<Option<f64>, ContableError> {
        self.row_obar(row)
    }

    /// Share of all forecasts falling in bin `row`.
    pub fn row_refinement(&self, row: usize) -> Result<Option<f64>, ContableError> {
        self.check_row(row)?;
        Ok(ratio(self.table.row_sum(row), self.n()))
    }

    /// Share of all events forecast in bin `row`.
    pub fn row_event_likelihood(&self, row: usize) -> Result<Option<f64>, ContableError> {
        self.check_row(row)?;
        Ok(ratio(self.events(row), self.event_total()))
    }

    /// Share of all non-events forecast in bin `row`.
    pub fn row_nonevent_likelihood(&self, row: usize) -> Result<Option<f64>, ContableError> {
        self.check_row(row)?;
        Ok(ratio(self.nonevents(row), self.nonevent_total()))
    }

    /// 2x2 table from treating bins above `row` as a yes forecast.
    pub fn ctc_by_row(&self, row: usize) -> Result<TwoByTwoTable, ContableError> {
        self.check_row(row)?;
        let (mut fy_oy, mut fy_on, mut fn_oy, mut fn_on) = (0, 0, 0, 0);
        for j in 0..self.n_rows() {
            if j > row {
                fy_oy += self.events(j);
                fy_on += self.nonevents(j);
            } else {
                fn_oy += self.events(j);
                fn_on += self.nonevents(j);
            }
        }
        Ok(TwoByTwoTable::from_counts(fy_oy, fy_on, fn_oy, fn_on))
    }

    /// ROC curve points (POFD, POD), one per bin boundary, from (1, 1)
    /// downward. Bins whose 2x2 table is degenerate are skipped.
    pub fn roc_points(&self) -> Vec<(f64, f64)> {
        (0..self.n_rows())
            .filter_map(|r| {
                let ct = self.ctc_by_row(r).ok()?;
                Some((ct.pofd()?, ct.pod_yes()?))
            })
            .collect()
    }

    /// Area under the ROC curve by the trapezoid rule, starting from (1, 1).
    pub fn roc_auc(&self) -> Option<f64> {
        let points = self.roc_points();
        if points.is_empty() {
            return None;
        }
        let (mut x_prev, mut y_prev) = (1.0, 1.0);
        let mut area = 0.0;
        for (x, y) in points {
            area += (x_prev - x) * (y_prev + y) * 0.5;
            x_prev = x;
            y_prev = y;
        }
        Some(area)
    }
}

fn check_thresholds(thresholds: &[f64]) -> Result<(), ContableError> {
    if thresholds.len() < 3 {
        return Err(ContableError::InvalidThresholds {
            reason: format!("need at least 3 thresholds, got {}", thresholds.len()),
        });
    }
    if thresholds.iter().any(|t| !t.is_finite()) {
        return Err(ContableError::InvalidThresholds {
            reason: "thresholds must be finite".to_string(),
        });
    }
    if let Some(i) = thresholds.windows(2).position(|w| w[1] <= w[0]) {
        return Err(ContableError::InvalidThresholds {
            reason: format!("thresholds must be strictly increasing at index {}", i + 1),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Two bins; 10 events split 7/3 and 10 non-events split 2/8.
    fn two_bin() -> Nx2Table {
        let mut t = Nx2Table::new(vec![0.0, 0.5, 1.0]).unwrap();
        t.set_row(0, 7, 2).unwrap();
        t.set_row(1, 3, 8).unwrap();
        t
    }

    #[test]
    fn value_to_row_boundaries() {
        let t = Nx2Table::new(vec![0.0, 0.25, 0.5, 1.0]).unwrap();
        assert_eq!(t.value_to_row(0.0).unwrap(), 0);
        assert_eq!(t.value_to_row(0.2499).unwrap(), 0);
        assert_eq!(t.value_to_row(0.25).unwrap(), 1);
        assert_eq!(t.value_to_row(0.75).unwrap(), 2);
        assert_eq!(t.value_to_row(1.0).unwrap(), 2);
        assert!(matches!(
            t.value_to_row(1.01),
            Err(ContableError::ValueOutOfRange { .. })
        ));
        assert!(t.value_to_row(-0.1).is_err());
        assert!(t.value_to_row(f64::NAN).is_err());
    }

    #[test]
    fn inc_rejects_out_of_range() {
        let mut t = Nx2Table::uniform(4).unwrap();
        t.inc_event(0.3).unwrap();
        t.inc_nonevent(1.0).unwrap();
        assert!(t.inc_event(2.0).is_err());
        assert_eq!(t.n(), 2);
        assert_eq!(t.event_count_by_row(1).unwrap(), 1);
        assert_eq!(t.nonevent_count_by_row(3).unwrap(), 1);
    }

    #[test]
    fn threshold_validation() {
        assert!(Nx2Table::new(vec![0.0, 1.0]).is_err());
        assert!(Nx2Table::new(vec![0.0, 0.5, 0.5]).is_err());
        assert!(Nx2Table::new(vec![0.0, f64::NAN, 1.0]).is_err());
        let mut t = Nx2Table::uniform(2).unwrap();
        assert!(t.set_thresholds(vec![0.0, 0.3, 0.6, 1.0]).is_err());
        t.set_thresholds(vec![0.0, 0.3, 1.0]).unwrap();
        assert_relative_eq!(t.threshold(1).unwrap(), 0.3);
        assert!(t.threshold(3).is_err());
    }

    #[test]
    fn base_rate_and_brier_two_bins() {
        let t = two_bin();
        assert_relative_eq!(t.baser().unwrap(), 0.5);
        let bs = t.brier_score().unwrap();
        // midpoints 0.25, 0.75:
        // events: 7*(0.75^2) + 3*(0.25^2); nonevents: 2*0.0625 + 8*0.5625
        let expected = (7.0 * 0.5625 + 3.0 * 0.0625 + 2.0 * 0.0625 + 8.0 * 0.5625) / 20.0;
        assert_relative_eq!(expected, 0.4375);
        assert_relative_eq!(bs, expected, epsilon = 1e-12);
    }

    #[test]
    fn brier_beats_climatology_when_events_sit_in_high_bin() {
        let mut t = Nx2Table::new(vec![0.0, 0.5, 1.0]).unwrap();
        t.set_row(0, 3, 8).unwrap();
        t.set_row(1, 7, 2).unwrap();
        assert_relative_eq!(t.baser().unwrap(), 0.5);
        let bs = t.brier_score().unwrap();
        assert!(bs > 0.0 && bs < 0.25);
        // events: 3*0.5625 + 7*0.0625; nonevents: 8*0.0625 + 2*0.5625
        assert_relative_eq!(bs, 0.1875, epsilon = 1e-12);
    }

    #[test]
    fn brier_ci_halfwidth_uses_fourth_moment_of_bin_errors() {
        let t = two_bin();
        // E[(y - x)^4] = (15 * 0.75^4 + 5 * 0.25^4) / 20; BS = 0.4375
        let m4 = (15.0 * 0.31640625 + 5.0 * 0.00390625) / 20.0;
        let var: f64 = (m4 - 0.4375 * 0.4375) / 20.0;
        let t_crit = students_t_quantile(0.975, 19.0).unwrap();
        assert_relative_eq!(
            t.brier_ci_halfwidth(0.05).unwrap(),
            t_crit * var.sqrt(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn brier_decomposition_identity() {
        // With midpoint forecasts equal within each bin, BS = REL - RES + UNC.
        let mut t = Nx2Table::uniform(5).unwrap();
        let counts = [(1, 20), (3, 15), (6, 9), (9, 4), (12, 2)];
        for (r, &(e, ne)) in counts.iter().enumerate() {
            t.set_row(r, e, ne).unwrap();
        }
        let bs = t.brier_score().unwrap();
        let rel = t.reliability().unwrap();
        let res = t.resolution().unwrap();
        let unc = t.uncertainty().unwrap();
        assert_relative_eq!(bs, rel - res + unc, epsilon = 1e-12);
        assert_relative_eq!(t.bss_smpl().unwrap(), (res - rel) / unc, epsilon = 1e-12);
    }

    #[test]
    fn ctc_by_row_splits_at_boundary() {
        let t = two_bin();
        let ct = t.ctc_by_row(0).unwrap();
        assert_eq!(ct.fy_oy(), 3);
        assert_eq!(ct.fy_on(), 8);
        assert_eq!(ct.fn_oy(), 7);
        assert_eq!(ct.fn_on(), 2);
        let last = t.ctc_by_row(1).unwrap();
        assert_eq!(last.fy_total(), 0);
        assert!(t.ctc_by_row(2).is_err());
    }

    #[test]
    fn roc_auc_perfect_and_inverted() {
        let mut perfect = Nx2Table::uniform(2).unwrap();
        perfect.set_row(0, 0, 10).unwrap();
        perfect.set_row(1, 10, 0).unwrap();
        assert_relative_eq!(perfect.roc_auc().unwrap(), 1.0, epsilon = 1e-12);

        let mut inverted = Nx2Table::uniform(2).unwrap();
        inverted.set_row(0, 10, 0).unwrap();
        inverted.set_row(1, 0, 10).unwrap();
        assert_relative_eq!(inverted.roc_auc().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn roc_auc_no_skill_is_half() {
        let mut t = Nx2Table::uniform(4).unwrap();
        for r in 0..4 {
            t.set_row(r, 5, 10).unwrap();
        }
        assert_relative_eq!(t.roc_auc().unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn brier_ci_halfwidth_behaviour() {
        let t = two_bin();
        let hw = t.brier_ci_halfwidth(0.05).unwrap();
        assert!(hw > 0.0);
        assert!(t.brier_ci_halfwidth(0.5).unwrap() < hw);

        let mut single = Nx2Table::uniform(2).unwrap();
        single.inc_event(0.9).unwrap();
        assert!(single.brier_ci_halfwidth(0.05).is_none());
    }

    #[test]
    fn row_likelihoods_sum_to_one() {
        let t = two_bin();
        let ev: f64 = (0..2).map(|r| t.row_event_likelihood(r).unwrap().unwrap()).sum();
        let ne: f64 = (0..2).map(|r| t.row_nonevent_likelihood(r).unwrap().unwrap()).sum();
        let rf: f64 = (0..2).map(|r| t.row_refinement(r).unwrap().unwrap()).sum();
        assert_relative_eq!(ev, 1.0);
        assert_relative_eq!(ne, 1.0);
        assert_relative_eq!(rf, 1.0);
        assert_relative_eq!(t.row_calibration(0).unwrap().unwrap(), 7.0 / 9.0);
    }

    #[test]
    fn empty_table_is_none() {
        let t = Nx2Table::uniform(3).unwrap();
        assert!(t.baser().is_none());
        assert!(t.brier_score().is_none());
        assert!(t.reliability().is_none());
        assert!(t.resolution().is_none());
        assert!(t.roc_auc().is_none());
    }

    #[test]
    fn merge_requires_matching_bins() {
        let mut a = two_bin();
        a.try_add(&two_bin()).unwrap();
        assert_eq!(a.n(), 40);
        let other = Nx2Table::new(vec![0.0, 0.4, 1.0]).unwrap();
        assert!(a.try_add(&other).is_err());
    }
}
