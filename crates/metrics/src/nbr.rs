//! Neighborhood methods: statistics of fractional event coverage.
//!
//! A raw field is thresholded to events, then each grid point is replaced by
//! the fraction of events in the square neighborhood around it. Categorical
//! scores come from thresholding that coverage again; continuous scores
//! (FBS, FSS) compare the coverage fields directly.

use std::ops::AddAssign;

use serde::Serialize;
use tracing::debug;
use verif_stats::is_eq;
use verif_thresh::SingleThresh;

use crate::ci_info::{CiInfo, check_alpha};
use crate::cts::CtsInfo;
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::{PairData, check_indices, check_len};

/// Fractional coverage pairs plus the raw-field events behind them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NbrPairs {
    coverage: PairData,
    f_event: Vec<bool>,
    o_event: Vec<bool>,
}

impl NbrPairs {
    /// Wraps precomputed coverage pairs and raw-field event flags.
    pub fn new(
        coverage: PairData,
        f_event: Vec<bool>,
        o_event: Vec<bool>,
    ) -> Result<Self, MetricsError> {
        check_len("f_event", coverage.len(), f_event.len())?;
        check_len("o_event", coverage.len(), o_event.len())?;
        Ok(Self {
            coverage,
            f_event,
            o_event,
        })
    }

    /// Computes coverage pairs from raw `nx` x `ny` fields stored row by row.
    ///
    /// Each point's coverage is the event fraction over the `width` x `width`
    /// neighborhood centered on it, clipped at the grid edges.
    pub fn from_raw(
        nx: usize,
        ny: usize,
        fcst: &[f64],
        obs: &[f64],
        fthresh: &SingleThresh,
        othresh: &SingleThresh,
        width: usize,
    ) -> Result<Self, MetricsError> {
        if width == 0 || width % 2 == 0 {
            return Err(MetricsError::InvalidWidth { width });
        }
        for len in [fcst.len(), obs.len()] {
            if len != nx * ny {
                return Err(MetricsError::GridShape { nx, ny, len });
            }
        }
        let f_event: Vec<bool> = fcst.iter().map(|&v| fthresh.check(v, None, None)).collect();
        let o_event: Vec<bool> = obs.iter().map(|&v| othresh.check(v, None, None)).collect();
        let f_cov = fractional_coverage(nx, ny, &f_event, width);
        let o_cov = fractional_coverage(nx, ny, &o_event, width);
        debug!(nx, ny, width, "computed fractional coverage");
        Self::new(PairData::new(&f_cov, &o_cov)?, f_event, o_event)
    }

    /// Coverage pairs.
    pub fn coverage(&self) -> &PairData {
        &self.coverage
    }

    /// Raw forecast events.
    pub fn f_event(&self) -> &[bool] {
        &self.f_event
    }

    /// Raw observation events.
    pub fn o_event(&self) -> &[bool] {
        &self.o_event
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.coverage.len()
    }

    /// True when there are no points.
    pub fn is_empty(&self) -> bool {
        self.coverage.is_empty()
    }
}

/// Event fraction in the neighborhood of every point, via a summed-area
/// table.
fn fractional_coverage(nx: usize, ny: usize, event: &[bool], width: usize) -> Vec<f64> {
    let half = width / 2;
    // sat[(y+1)*(nx+1) + (x+1)] = events in [0, x] x [0, y]
    let mut sat = vec![0u32; (nx + 1) * (ny + 1)];
    for y in 0..ny {
        for x in 0..nx {
            sat[(y + 1) * (nx + 1) + x + 1] = u32::from(event[y * nx + x])
                + sat[y * (nx + 1) + x + 1]
                + sat[(y + 1) * (nx + 1) + x]
                - sat[y * (nx + 1) + x];
        }
    }
    let mut out = Vec::with_capacity(nx * ny);
    for y in 0..ny {
        let (y0, y1) = (y.saturating_sub(half), (y + half + 1).min(ny));
        for x in 0..nx {
            let (x0, x1) = (x.saturating_sub(half), (x + half + 1).min(nx));
            let count = sat[y1 * (nx + 1) + x1] + sat[y0 * (nx + 1) + x0]
                - sat[y0 * (nx + 1) + x1]
                - sat[y1 * (nx + 1) + x0];
            let area = (y1 - y0) * (x1 - x0);
            out.push(f64::from(count) / area as f64);
        }
    }
    out
}

/// Categorical scores of thresholded fractional coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbrCtsInfo {
    raw_fthresh: SingleThresh,
    raw_othresh: SingleThresh,
    nbr_wdth: usize,
    /// Scores of the coverage table; the event is coverage passing the
    /// coverage threshold in both fields.
    pub cts_info: CtsInfo,
}

impl NbrCtsInfo {
    /// Creates an empty family.
    pub fn new(
        raw_fthresh: SingleThresh,
        raw_othresh: SingleThresh,
        cthresh: SingleThresh,
        nbr_wdth: usize,
        alpha: &[f64],
    ) -> Result<Self, MetricsError> {
        Ok(Self {
            raw_fthresh,
            raw_othresh,
            nbr_wdth,
            cts_info: CtsInfo::new(cthresh, cthresh, alpha)?,
        })
    }

    /// Raw forecast event threshold.
    pub fn raw_fthresh(&self) -> &SingleThresh {
        &self.raw_fthresh
    }

    /// Raw observation event threshold.
    pub fn raw_othresh(&self) -> &SingleThresh {
        &self.raw_othresh
    }

    /// Coverage threshold.
    pub fn cthresh(&self) -> &SingleThresh {
        self.cts_info.fthresh()
    }

    /// Neighborhood width.
    pub fn nbr_wdth(&self) -> usize {
        self.nbr_wdth
    }

    /// Rebuilds the coverage table from the points at `indices`.
    pub fn set_pairs(&mut self, pairs: &NbrPairs, indices: &[usize]) -> Result<(), MetricsError> {
        self.cts_info.set_pairs(pairs.coverage(), indices)
    }

    /// Derives the point statistics.
    pub fn compute_stats(&mut self) {
        self.cts_info.compute_stats();
    }

    /// Fills the normal-approximation bounds.
    pub fn compute_ci(&mut self) {
        self.cts_info.compute_ci();
    }
}

impl StatFamily for NbrCtsInfo {
    type Pairs = NbrPairs;

    const NAME: &'static str = "NBRCTS";

    fn n_pairs(pairs: &NbrPairs) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        self.cts_info.alpha()
    }

    fn total(&self) -> u64 {
        self.cts_info.total()
    }

    fn ci_fields(&self) -> Vec<(&'static str, &CiInfo)> {
        self.cts_info.ci_fields()
    }

    fn ci_fields_mut(&mut self) -> Vec<(&'static str, &mut CiInfo)> {
        self.cts_info.ci_fields_mut()
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        self.cts_info.extra_stats()
    }

    fn replicate(&self, pairs: &NbrPairs, indices: &[usize]) -> Result<Self, MetricsError> {
        Ok(Self {
            raw_fthresh: self.raw_fthresh,
            raw_othresh: self.raw_othresh,
            nbr_wdth: self.nbr_wdth,
            cts_info: self.cts_info.replicate(pairs.coverage(), indices)?,
        })
    }
}

/// Continuous scores of fractional coverage: the fractions Brier score and
/// fractions skill score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NbrCntInfo {
    raw_fthresh: SingleThresh,
    raw_othresh: SingleThresh,
    nbr_wdth: usize,
    alpha: Vec<f64>,
    n: u64,
    ffbar: f64,
    oobar: f64,
    fobar: f64,
    f_rate_bar: f64,
    o_rate_bar: f64,
    /// Fractions Brier score.
    pub fbs: CiInfo,
    /// Fractions skill score.
    pub fss: CiInfo,
    /// Asymptotic fractions skill score.
    pub afss: Option<f64>,
    /// Uniform fractions skill score.
    pub ufss: Option<f64>,
    /// Raw forecast event rate.
    pub f_rate: Option<f64>,
    /// Raw observation event rate.
    pub o_rate: Option<f64>,
}

impl NbrCntInfo {
    /// Creates an empty family.
    pub fn new(
        raw_fthresh: SingleThresh,
        raw_othresh: SingleThresh,
        nbr_wdth: usize,
        alpha: &[f64],
    ) -> Result<Self, MetricsError> {
        let alpha = check_alpha(alpha)?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            raw_fthresh,
            raw_othresh,
            nbr_wdth,
            alpha,
            n: 0,
            ffbar: 0.0,
            oobar: 0.0,
            fobar: 0.0,
            f_rate_bar: 0.0,
            o_rate_bar: 0.0,
            fbs: ci.clone(),
            fss: ci,
            afss: None,
            ufss: None,
            f_rate: None,
            o_rate: None,
        })
    }

    /// Raw forecast event threshold.
    pub fn raw_fthresh(&self) -> &SingleThresh {
        &self.raw_fthresh
    }

    /// Raw observation event threshold.
    pub fn raw_othresh(&self) -> &SingleThresh {
        &self.raw_othresh
    }

    /// Neighborhood width.
    pub fn nbr_wdth(&self) -> usize {
        self.nbr_wdth
    }

    /// Accumulates weighted coverage sums and raw event rates over the
    /// points at `indices`.
    pub fn set_pairs(&mut self, pairs: &NbrPairs, indices: &[usize]) -> Result<(), MetricsError> {
        check_indices(indices, pairs.len())?;
        let cov = pairs.coverage();
        let (f, o) = (cov.fcst(), cov.obs());
        let w = cov.normalized_weights(indices);
        self.ffbar = 0.0;
        self.oobar = 0.0;
        self.fobar = 0.0;
        self.f_rate_bar = 0.0;
        self.o_rate_bar = 0.0;
        for (&j, &wj) in indices.iter().zip(&w) {
            self.ffbar += wj * f[j] * f[j];
            self.oobar += wj * o[j] * o[j];
            self.fobar += wj * f[j] * o[j];
            self.f_rate_bar += wj * f64::from(u8::from(pairs.f_event[j]));
            self.o_rate_bar += wj * f64::from(u8::from(pairs.o_event[j]));
        }
        self.n = indices.len() as u64;
        Ok(())
    }

    /// Derives the point statistics from the sums.
    pub fn compute_stats(&mut self) {
        for ci in [&mut self.fbs, &mut self.fss] {
            ci.set_bad_data();
            ci.n = self.n;
        }
        self.afss = None;
        self.ufss = None;
        self.f_rate = None;
        self.o_rate = None;
        if self.n == 0 {
            return;
        }

        let fbs = self.ffbar + self.oobar - 2.0 * self.fobar;
        let den = self.ffbar + self.oobar;
        self.fbs.v = Some(fbs);
        self.fss.v = (!is_eq(den, 0.0)).then(|| 1.0 - fbs / den);

        let (fr, or) = (self.f_rate_bar, self.o_rate_bar);
        let den = fr * fr + or * or;
        self.afss = (!is_eq(den, 0.0)).then(|| 2.0 * fr * or / den);
        self.ufss = Some(0.5 + or / 2.0);
        self.f_rate = Some(fr);
        self.o_rate = Some(or);
    }
}

impl AddAssign<&NbrCntInfo> for NbrCntInfo {
    /// Count-weighted merge of the sums. Call
    /// [`NbrCntInfo::compute_stats`] afterwards.
    fn add_assign(&mut self, c: &NbrCntInfo) {
        let total = self.n + c.n;
        if total > 0 {
            let (wa, wb) = (self.n as f64 / total as f64, c.n as f64 / total as f64);
            self.ffbar = wa * self.ffbar + wb * c.ffbar;
            self.oobar = wa * self.oobar + wb * c.oobar;
            self.fobar = wa * self.fobar + wb * c.fobar;
            self.f_rate_bar = wa * self.f_rate_bar + wb * c.f_rate_bar;
            self.o_rate_bar = wa * self.o_rate_bar + wb * c.o_rate_bar;
        }
        self.n = total;
    }
}

impl StatFamily for NbrCntInfo {
    type Pairs = NbrPairs;

    const NAME: &'static str = "NBRCNT";

    fn n_pairs(pairs: &NbrPairs) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.n
    }

    ci_fields! {
        "FBS" => fbs,
        "FSS" => fss,
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("AFSS", self.afss),
            ("UFSS", self.ufss),
            ("F_RATE", self.f_rate),
            ("O_RATE", self.o_rate),
        ]
    }

    fn replicate(&self, pairs: &NbrPairs, indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(self.raw_fthresh, self.raw_othresh, self.nbr_wdth, &self.alpha)?;
        out.set_pairs(pairs, indices)?;
        out.compute_stats();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gt(v: &str) -> SingleThresh {
        v.parse().unwrap()
    }

    #[test]
    fn coverage_of_a_single_event() {
        let mut e = vec![false; 9];
        e[4] = true;
        let cov = fractional_coverage(3, 3, &e, 3);
        // Corners see a 2x2 window, edges 2x3, the center all 9 points.
        assert_relative_eq!(cov[0], 0.25);
        assert_relative_eq!(cov[1], 1.0 / 6.0);
        assert_relative_eq!(cov[4], 1.0 / 9.0);
    }

    #[test]
    fn width_one_is_the_raw_field() {
        let e = [true, false, false, true];
        assert_eq!(fractional_coverage(2, 2, &e, 1), vec![1.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn from_raw_validates_shape() {
        let r = NbrPairs::from_raw(2, 2, &[0.0; 3], &[0.0; 4], &gt(">1"), &gt(">1"), 3);
        assert!(matches!(r, Err(MetricsError::GridShape { len: 3, .. })));
        let r = NbrPairs::from_raw(2, 2, &[0.0; 4], &[0.0; 4], &gt(">1"), &gt(">1"), 2);
        assert!(matches!(r, Err(MetricsError::InvalidWidth { width: 2 })));
    }

    #[test]
    fn identical_fields_score_perfectly() {
        let field = [0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 5.0, 0.0, 0.0];
        let p = NbrPairs::from_raw(3, 3, &field, &field, &gt(">1"), &gt(">1"), 3).unwrap();
        let mut c = NbrCntInfo::new(gt(">1"), gt(">1"), 3, &[0.05]).unwrap();
        c.set_pairs(&p, &(0..9).collect::<Vec<_>>()).unwrap();
        c.compute_stats();
        assert_relative_eq!(c.fbs.v.unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(c.fss.v.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.f_rate.unwrap(), 1.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(c.afss.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(c.ufss.unwrap(), 0.5 + 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn no_events_leaves_fss_missing() {
        let field = [0.0; 4];
        let p = NbrPairs::from_raw(2, 2, &field, &field, &gt(">1"), &gt(">1"), 1).unwrap();
        let mut c = NbrCntInfo::new(gt(">1"), gt(">1"), 1, &[0.05]).unwrap();
        c.set_pairs(&p, &[0, 1, 2, 3]).unwrap();
        c.compute_stats();
        assert_eq!(c.fbs.v, Some(0.0));
        assert!(c.fss.v.is_none());
        assert!(c.afss.is_none());
    }

    #[test]
    fn merge_matches_pooled_sums() {
        let f = [0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 5.0, 0.0, 0.0];
        let o = [2.0, 0.0, 0.0, 3.0, 0.0, 2.0, 0.0, 0.0, 0.0];
        let p = NbrPairs::from_raw(3, 3, &f, &o, &gt(">1"), &gt(">1"), 3).unwrap();
        let mut a = NbrCntInfo::new(gt(">1"), gt(">1"), 3, &[0.05]).unwrap();
        let mut b = a.clone();
        let mut all = a.clone();
        a.set_pairs(&p, &[0, 1, 2, 3]).unwrap();
        b.set_pairs(&p, &[4, 5, 6, 7, 8]).unwrap();
        all.set_pairs(&p, &(0..9).collect::<Vec<_>>()).unwrap();
        a += &b;
        a.compute_stats();
        all.compute_stats();
        assert_eq!(a.total(), 9);
        assert_relative_eq!(a.fss.v.unwrap(), all.fss.v.unwrap(), epsilon = 1e-12);
        assert_relative_eq!(a.o_rate.unwrap(), all.o_rate.unwrap(), epsilon = 1e-12);
    }

    #[test]
    fn nbrcts_thresholds_coverage() {
        let f = [0.0, 2.0, 0.0, 3.0, 0.0, 0.0, 5.0, 0.0, 0.0];
        let p = NbrPairs::from_raw(3, 3, &f, &f, &gt(">1"), &gt(">1"), 3).unwrap();
        let mut c = NbrCtsInfo::new(gt(">1"), gt(">1"), gt(">=0.3"), 3, &[0.05]).unwrap();
        c.set_pairs(&p, &(0..9).collect::<Vec<_>>()).unwrap();
        c.compute_stats();
        assert_eq!(c.total(), 9);
        assert_eq!(c.cts_info.table().fy_on(), 0);
        assert_eq!(c.cts_info.table().fn_oy(), 0);
        assert_eq!(NbrCtsInfo::NAME, "NBRCTS");
        assert_eq!(c.get_stat("acc").unwrap(), Some(1.0));
        assert_eq!(c.nbr_wdth(), 3);
    }
}
