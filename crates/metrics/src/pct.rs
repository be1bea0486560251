//! Probabilistic forecast statistics from probability-bin tables.

use serde::Serialize;
use verif_contable::{Interval, Nx2Table};
use verif_stats::{is_eq, normal_cdf};
use verif_thresh::SingleThresh;

use crate::ci_info::{CiInfo, check_alpha};
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::PairData;

/// Forecast probabilities binned against an observed event, plus the same
/// table for the climatological probability of the event when pairs carry a
/// climatology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PctInfo {
    othresh: SingleThresh,
    alpha: Vec<f64>,
    pct: Nx2Table,
    climo_pct: Nx2Table,
    /// Observed event rate.
    pub baser: CiInfo,
    /// Brier score of the forecast.
    pub brier: CiInfo,
    /// Brier score of the climatological probability.
    pub briercl: CiInfo,
}

impl PctInfo {
    /// Creates an empty family.
    ///
    /// `prob_thresh` are the bin boundaries; they must run from 0 to 1.
    pub fn new(
        prob_thresh: Vec<f64>,
        othresh: SingleThresh,
        alpha: &[f64],
    ) -> Result<Self, MetricsError> {
        match (prob_thresh.first(), prob_thresh.last()) {
            (Some(&lo), Some(&hi)) if is_eq(lo, 0.0) && is_eq(hi, 1.0) => {}
            _ => {
                return Err(MetricsError::InvalidProbThresh {
                    reason: format!("bins must span [0, 1], got {prob_thresh:?}"),
                });
            }
        }
        let alpha = check_alpha(alpha)?;
        let pct = Nx2Table::new(prob_thresh)?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            othresh,
            alpha,
            climo_pct: pct.clone(),
            pct,
            baser: ci.clone(),
            brier: ci.clone(),
            briercl: ci,
        })
    }

    /// Observation event threshold.
    pub fn othresh(&self) -> &SingleThresh {
        &self.othresh
    }

    /// Probability bin boundaries.
    pub fn prob_thresh(&self) -> &[f64] {
        self.pct.thresholds()
    }

    /// Forecast probability table.
    pub fn table(&self) -> &Nx2Table {
        &self.pct
    }

    /// Climatological probability table.
    pub fn climo_table(&self) -> &Nx2Table {
        &self.climo_pct
    }

    /// Counts one pair of forecast probability and observed value.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError::Contable`] when the probability is outside the
    /// bins.
    pub fn add(
        &mut self,
        prob: f64,
        o: f64,
        climo_mean: Option<f64>,
        climo_stdev: Option<f64>,
    ) -> Result<(), MetricsError> {
        let event = self.othresh.check(o, climo_mean, climo_stdev);
        if event {
            self.pct.inc_event(prob)?;
        } else {
            self.pct.inc_nonevent(prob)?;
        }
        if let Some(cp) = climo_probability(&self.othresh, climo_mean, climo_stdev) {
            if event {
                self.climo_pct.inc_event(cp)?;
            } else {
                self.climo_pct.inc_nonevent(cp)?;
            }
        }
        Ok(())
    }

    /// Rebuilds both tables from the pairs at `indices`. Forecast values are
    /// read as probabilities.
    pub fn set_pairs(&mut self, pairs: &PairData, indices: &[usize]) -> Result<(), MetricsError> {
        pairs.check_indices(indices)?;
        self.pct = Nx2Table::new(self.pct.thresholds().to_vec())?;
        self.climo_pct = self.pct.clone();
        let (f, o) = (pairs.fcst(), pairs.obs());
        for &j in indices {
            self.add(f[j], o[j], pairs.climo_mean(j), pairs.climo_stdev(j))?;
        }
        Ok(())
    }

    /// Derives the point statistics from the tables.
    pub fn compute_stats(&mut self) {
        self.baser.v = self.pct.baser();
        self.brier.v = self.pct.brier_score();
        self.briercl.v = self.climo_pct.brier_score();
        let n = self.pct.n();
        self.baser.n = n;
        self.brier.n = n;
        self.briercl.n = self.climo_pct.n();
    }

    /// Fills the normal-approximation bounds: Wilson for the base rate and
    /// the Bradley sampling variance for both Brier scores.
    pub fn compute_ci(&mut self) {
        for (i, &a) in self.alpha.iter().enumerate() {
            self.baser.set_normal(i, self.pct.baser_ci(a, self.baser.vif));
            let brier = brier_ci(&self.pct, &self.brier, a);
            self.brier.set_normal(i, brier);
            let briercl = brier_ci(&self.climo_pct, &self.briercl, a);
            self.briercl.set_normal(i, briercl);
        }
    }

    /// Brier skill score against the climatological probability.
    pub fn bss(&self) -> Option<f64> {
        let bs = self.brier.v?;
        let cl = self.briercl.v.filter(|&c| !is_eq(c, 0.0))?;
        Some(1.0 - bs / cl)
    }
}

fn brier_ci(table: &Nx2Table, ci: &CiInfo, alpha: f64) -> Option<Interval> {
    let v = ci.v?;
    let hw = table.brier_ci_halfwidth(alpha)? * ci.vif.sqrt();
    Some(Interval::new(v - hw, v + hw))
}

/// Probability of the observation event under a normal climatology.
///
/// `None` without a positive climatological spread or for thresholds that
/// are not one-sided.
pub fn climo_probability(
    othresh: &SingleThresh,
    climo_mean: Option<f64>,
    climo_stdev: Option<f64>,
) -> Option<f64> {
    let (cmn, csd) = (climo_mean?, climo_stdev?);
    if csd <= 0.0 {
        return None;
    }
    let v = othresh.resolve(Some(cmn), Some(csd))?;
    let below = normal_cdf((v - cmn) / csd);
    let op = othresh.op();
    if op.is_upper_bound() {
        Some(below)
    } else if op.is_lower_bound() {
        Some(1.0 - below)
    } else {
        None
    }
}

impl StatFamily for PctInfo {
    type Pairs = PairData;

    const NAME: &'static str = "PCT";

    fn n_pairs(pairs: &PairData) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.pct.n()
    }

    ci_fields! {
        "BASER" => baser,
        "BRIER" => brier,
        "BRIERCL" => briercl,
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("BSS", self.bss()),
            ("BSS_SMPL", self.pct.bss_smpl()),
            ("RELIABILITY", self.pct.reliability()),
            ("RESOLUTION", self.pct.resolution()),
            ("UNCERTAINTY", self.pct.uncertainty()),
            ("ROC_AUC", self.pct.roc_auc()),
        ]
    }

    fn replicate(&self, pairs: &PairData, indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(self.pct.thresholds().to_vec(), self.othresh, &self.alpha)?;
        out.set_pairs(pairs, indices)?;
        out.compute_stats();
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quartiles() -> Vec<f64> {
        vec![0.0, 0.25, 0.5, 0.75, 1.0]
    }

    #[test]
    fn bins_must_span_unit_interval() {
        let r = PctInfo::new(vec![0.1, 0.5, 1.0], ">0".parse().unwrap(), &[0.05]);
        assert!(matches!(r, Err(MetricsError::InvalidProbThresh { .. })));
        let r = PctInfo::new(vec![0.0, 1.0], ">0".parse().unwrap(), &[0.05]);
        assert!(matches!(r, Err(MetricsError::Contable(_))));
    }

    #[test]
    fn brier_from_pairs() {
        // Midpoints 0.125 and 0.875; one miss in each bin.
        let prob = [0.1, 0.1, 0.1, 0.9, 0.9, 0.9];
        let obs = [0.0, 0.0, 2.0, 2.0, 2.0, 0.0];
        let pd = PairData::new(&prob, &obs).unwrap();
        let mut p = PctInfo::new(quartiles(), ">1".parse().unwrap(), &[0.05]).unwrap();
        p.set_pairs(&pd, &pd.all_indices()).unwrap();
        p.compute_stats();
        p.compute_ci();
        let expected = (2.0 * 0.125f64.powi(2) + 0.875f64.powi(2)) / 3.0;
        assert_relative_eq!(p.brier.v.unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(p.baser.v.unwrap(), 0.5);
        assert_eq!(p.total(), 6);
        let ci = p.brier.normal(0).unwrap();
        assert!(ci.lower < expected && expected < ci.upper);
        assert!(p.briercl.v.is_none());
        assert!(p.bss().is_none());
    }

    #[test]
    fn probability_outside_bins_is_an_error() {
        let mut p = PctInfo::new(quartiles(), ">1".parse().unwrap(), &[0.05]).unwrap();
        assert!(matches!(
            p.add(1.5, 0.0, None, None),
            Err(MetricsError::Contable(_))
        ));
    }

    #[test]
    fn climatology_fills_reference_table() {
        let prob = [0.9, 0.8, 0.1, 0.2];
        let obs = [3.0, 2.5, 0.0, 0.5];
        let pd = PairData::new(&prob, &obs)
            .unwrap()
            .with_climo(&[1.0; 4], &[1.0; 4])
            .unwrap();
        let mut p = PctInfo::new(quartiles(), ">1".parse().unwrap(), &[0.05]).unwrap();
        p.set_pairs(&pd, &pd.all_indices()).unwrap();
        p.compute_stats();
        // Threshold at the climatological mean: climo probability 0.5,
        // binned at the 0.625 midpoint.
        assert_eq!(p.climo_table().n(), 4);
        assert_relative_eq!(p.briercl.v.unwrap(), 0.265625, epsilon = 1e-12);
        assert_relative_eq!(p.brier.v.unwrap(), 0.015625, epsilon = 1e-12);
        let bss = p.get_stat("BSS").unwrap().unwrap();
        assert!(bss > 0.0);
    }

    #[test]
    fn climo_probability_by_direction() {
        let gt: SingleThresh = ">1".parse().unwrap();
        let lt: SingleThresh = "<1".parse().unwrap();
        let p_gt = climo_probability(&gt, Some(0.0), Some(1.0)).unwrap();
        let p_lt = climo_probability(&lt, Some(0.0), Some(1.0)).unwrap();
        assert_relative_eq!(p_gt + p_lt, 1.0, epsilon = 1e-12);
        assert_relative_eq!(p_lt, 0.841345, epsilon = 1e-6);
        let eq: SingleThresh = "==1".parse().unwrap();
        assert!(climo_probability(&eq, Some(0.0), Some(1.0)).is_none());
        assert!(climo_probability(&gt, Some(0.0), Some(0.0)).is_none());
        assert!(climo_probability(&gt, None, Some(1.0)).is_none());
    }

    #[test]
    fn extra_stats_are_listed() {
        let p = PctInfo::new(quartiles(), ">1".parse().unwrap(), &[0.05]).unwrap();
        let names = p.stat_names();
        for n in ["TOTAL", "BRIER", "BSS_SMPL", "ROC_AUC"] {
            assert!(names.contains(&n));
        }
    }
}
