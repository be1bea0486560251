//! Multi-category contingency table statistics.

use serde::Serialize;
use verif_contable::{ContingencyTable, compute_proportion_ci};
use verif_thresh::ThreshArray;

use crate::ci_info::{CiInfo, check_alpha};
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::PairData;

/// Square table of forecast category by observed category, where the
/// categories come from a pair of threshold arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MctsInfo {
    fthresh: ThreshArray,
    othresh: ThreshArray,
    alpha: Vec<f64>,
    cts: ContingencyTable,
    /// Accuracy.
    pub acc: CiInfo,
    /// Generalized Hanssen-Kuipers score.
    pub hk: CiInfo,
    /// Generalized Heidke skill score.
    pub hss: CiInfo,
    /// Gerrity score.
    pub ger: CiInfo,
}

impl MctsInfo {
    /// Creates an empty family. Both threshold arrays must define the same
    /// number of categories.
    pub fn new(
        fthresh: ThreshArray,
        othresh: ThreshArray,
        alpha: &[f64],
    ) -> Result<Self, MetricsError> {
        if fthresh.len() != othresh.len() {
            return Err(MetricsError::ThresholdCount {
                fcst: fthresh.len(),
                obs: othresh.len(),
            });
        }
        let alpha = check_alpha(alpha)?;
        let cts = ContingencyTable::square(fthresh.n_categories())?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            fthresh,
            othresh,
            alpha,
            cts,
            acc: ci.clone(),
            hk: ci.clone(),
            hss: ci.clone(),
            ger: ci,
        })
    }

    /// Forecast category thresholds.
    pub fn fthresh(&self) -> &ThreshArray {
        &self.fthresh
    }

    /// Observation category thresholds.
    pub fn othresh(&self) -> &ThreshArray {
        &self.othresh
    }

    /// The accumulated table.
    pub fn table(&self) -> &ContingencyTable {
        &self.cts
    }

    /// Number of categories.
    pub fn n_categories(&self) -> usize {
        self.cts.rows()
    }

    /// Counts one pair.
    pub fn add(
        &mut self,
        f: f64,
        o: f64,
        climo_mean: Option<f64>,
        climo_stdev: Option<f64>,
    ) -> Result<(), MetricsError> {
        let r = self.fthresh.check_bins(f, climo_mean, climo_stdev);
        let c = self.othresh.check_bins(o, climo_mean, climo_stdev);
        self.cts.inc_entry(r, c)?;
        Ok(())
    }

    /// Rebuilds the table from the pairs at `indices`.
    pub fn set_pairs(&mut self, pairs: &PairData, indices: &[usize]) -> Result<(), MetricsError> {
        pairs.check_indices(indices)?;
        self.cts.zero_out();
        let (f, o) = (pairs.fcst(), pairs.obs());
        for &j in indices {
            self.add(f[j], o[j], pairs.climo_mean(j), pairs.climo_stdev(j))?;
        }
        Ok(())
    }

    /// Derives the point statistics from the table.
    pub fn compute_stats(&mut self) -> Result<(), MetricsError> {
        self.acc.v = self.cts.gaccuracy()?;
        self.hk.v = self.cts.gkuiper()?;
        self.hss.v = self.cts.gheidke()?;
        self.ger.v = self.cts.gerrity()?;
        let n = self.cts.total();
        for (_, ci) in self.ci_fields_mut() {
            ci.n = n;
        }
        Ok(())
    }

    /// Fills the normal-approximation bounds. Only accuracy has one.
    pub fn compute_ci(&mut self) {
        let n = self.cts.total();
        for (i, &a) in self.alpha.iter().enumerate() {
            self.acc
                .set_normal(i, compute_proportion_ci(self.acc.v, n, a, self.acc.vif));
        }
    }
}

impl StatFamily for MctsInfo {
    type Pairs = PairData;

    const NAME: &'static str = "MCTS";

    fn n_pairs(pairs: &PairData) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.cts.total()
    }

    ci_fields! {
        "ACC" => acc,
        "HK" => hk,
        "HSS" => hss,
        "GER" => ger,
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![("N_CAT", Some(self.n_categories() as f64))]
    }

    fn replicate(&self, pairs: &PairData, indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(self.fthresh.clone(), self.othresh.clone(), &self.alpha)?;
        out.set_pairs(pairs, indices)?;
        out.compute_stats()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn three_category() -> MctsInfo {
        MctsInfo::new(
            ">=1,>=5".parse().unwrap(),
            ">=1,>=5".parse().unwrap(),
            &[0.05],
        )
        .unwrap()
    }

    #[test]
    fn categories_from_thresholds() {
        let mut m = three_category();
        assert_eq!(m.n_categories(), 3);
        m.add(0.5, 0.2, None, None).unwrap();
        m.add(3.0, 7.0, None, None).unwrap();
        m.add(9.0, 9.0, None, None).unwrap();
        assert_eq!(m.table().entry(0, 0).unwrap(), 1);
        assert_eq!(m.table().entry(1, 2).unwrap(), 1);
        assert_eq!(m.table().entry(2, 2).unwrap(), 1);
    }

    #[test]
    fn perfect_forecast_scores_one() {
        let f = [0.0, 2.0, 6.0, 0.5, 3.0, 8.0];
        let pd = PairData::new(&f, &f).unwrap();
        let mut m = three_category();
        m.set_pairs(&pd, &pd.all_indices()).unwrap();
        m.compute_stats().unwrap();
        m.compute_ci();
        assert_relative_eq!(m.acc.v.unwrap(), 1.0);
        assert_relative_eq!(m.hss.v.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.hk.v.unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(m.ger.v.unwrap(), 1.0, epsilon = 1e-12);
        assert!(m.acc.normal(0).is_some());
        assert!(m.ger.normal(0).is_none());
    }

    #[test]
    fn mismatched_threshold_counts() {
        let r = MctsInfo::new(
            ">=1".parse().unwrap(),
            ">=1,>=5".parse().unwrap(),
            &[0.05],
        );
        assert!(matches!(
            r,
            Err(MetricsError::ThresholdCount { fcst: 1, obs: 2 })
        ));
    }

    #[test]
    fn empty_table_is_missing() {
        let mut m = three_category();
        m.compute_stats().unwrap();
        assert!(m.get_stat("GER").unwrap().is_none());
        assert_eq!(m.get_stat("total").unwrap(), Some(0.0));
    }
}
