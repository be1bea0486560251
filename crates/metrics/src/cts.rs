//! Dichotomous (2x2) contingency table statistics.

use serde::Serialize;
use verif_contable::TwoByTwoTable;
use verif_thresh::SingleThresh;

use crate::ci_info::{CiInfo, check_alpha};
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::PairData;

/// Counts of a forecast/observation event pair and the scores derived from
/// them.
///
/// A pair is a forecast "yes" when `fthresh` passes on the forecast value and
/// an observed "yes" when `othresh` passes on the observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtsInfo {
    fthresh: SingleThresh,
    othresh: SingleThresh,
    alpha: Vec<f64>,
    cts: TwoByTwoTable,
    /// Base rate.
    pub baser: CiInfo,
    /// Forecast mean.
    pub fmean: CiInfo,
    /// Accuracy.
    pub acc: CiInfo,
    /// Frequency bias.
    pub fbias: CiInfo,
    /// Probability of detecting yes.
    pub pody: CiInfo,
    /// Probability of detecting no.
    pub podn: CiInfo,
    /// Probability of false detection.
    pub pofd: CiInfo,
    /// False alarm ratio.
    pub far: CiInfo,
    /// Critical success index.
    pub csi: CiInfo,
    /// Gilbert skill score.
    pub gss: CiInfo,
    /// Hanssen-Kuipers discriminant.
    pub hk: CiInfo,
    /// Heidke skill score.
    pub hss: CiInfo,
    /// Odds ratio.
    pub odds: CiInfo,
    /// Log odds ratio.
    pub lodds: CiInfo,
    /// Odds ratio skill score.
    pub orss: CiInfo,
    /// Extreme dependency score.
    pub eds: CiInfo,
    /// Symmetric extreme dependency score.
    pub seds: CiInfo,
    /// Extremal dependency index.
    pub edi: CiInfo,
    /// Symmetric extremal dependency index.
    pub sedi: CiInfo,
    /// Bias-adjusted Gilbert skill score.
    pub bagss: CiInfo,
}

impl CtsInfo {
    /// Creates an empty family for the given event thresholds and alpha levels.
    pub fn new(
        fthresh: SingleThresh,
        othresh: SingleThresh,
        alpha: &[f64],
    ) -> Result<Self, MetricsError> {
        let alpha = check_alpha(alpha)?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            fthresh,
            othresh,
            alpha,
            cts: TwoByTwoTable::new(),
            baser: ci.clone(),
            fmean: ci.clone(),
            acc: ci.clone(),
            fbias: ci.clone(),
            pody: ci.clone(),
            podn: ci.clone(),
            pofd: ci.clone(),
            far: ci.clone(),
            csi: ci.clone(),
            gss: ci.clone(),
            hk: ci.clone(),
            hss: ci.clone(),
            odds: ci.clone(),
            lodds: ci.clone(),
            orss: ci.clone(),
            eds: ci.clone(),
            seds: ci.clone(),
            edi: ci.clone(),
            sedi: ci.clone(),
            bagss: ci,
        })
    }

    /// Forecast event threshold.
    pub fn fthresh(&self) -> &SingleThresh {
        &self.fthresh
    }

    /// Observation event threshold.
    pub fn othresh(&self) -> &SingleThresh {
        &self.othresh
    }

    /// The accumulated 2x2 table.
    pub fn table(&self) -> &TwoByTwoTable {
        &self.cts
    }

    /// Replaces the table counts directly.
    pub fn set_table(&mut self, table: TwoByTwoTable) {
        self.cts = table;
    }

    /// Replaces the alpha levels and clears every bound.
    pub fn set_alpha(&mut self, alpha: &[f64]) -> Result<(), MetricsError> {
        self.alpha = check_alpha(alpha)?;
        let k = self.alpha.len();
        for (_, ci) in self.ci_fields_mut() {
            ci.allocate_n_alpha(k);
        }
        Ok(())
    }

    /// Zeros the table and marks every statistic missing.
    pub fn clear(&mut self) {
        self.cts.zero_out();
        for (_, ci) in self.ci_fields_mut() {
            ci.set_bad_data();
        }
    }

    /// Counts one pair.
    pub fn add(&mut self, f: f64, o: f64, climo_mean: Option<f64>, climo_stdev: Option<f64>) {
        let fy = self.fthresh.check(f, climo_mean, climo_stdev);
        let oy = self.othresh.check(o, climo_mean, climo_stdev);
        self.cts.inc(fy, oy);
    }

    /// Rebuilds the table from the pairs at `indices`.
    pub fn set_pairs(&mut self, pairs: &PairData, indices: &[usize]) -> Result<(), MetricsError> {
        pairs.check_indices(indices)?;
        self.cts.zero_out();
        let (f, o) = (pairs.fcst(), pairs.obs());
        for &j in indices {
            self.add(f[j], o[j], pairs.climo_mean(j), pairs.climo_stdev(j));
        }
        Ok(())
    }

    /// Derives every point statistic from the table.
    pub fn compute_stats(&mut self) {
        let t = &self.cts;
        self.baser.v = t.baser();
        self.fmean.v = t.fmean();
        self.acc.v = t.accuracy();
        self.fbias.v = t.fbias();
        self.pody.v = t.pod_yes();
        self.podn.v = t.pod_no();
        self.pofd.v = t.pofd();
        self.far.v = t.far();
        self.csi.v = t.csi();
        self.gss.v = t.gss();
        self.hk.v = t.hk();
        self.hss.v = t.hss();
        self.odds.v = t.odds();
        self.lodds.v = t.lodds();
        self.orss.v = t.orss();
        self.eds.v = t.eds();
        self.seds.v = t.seds();
        self.edi.v = t.edi();
        self.sedi.v = t.sedi();
        self.bagss.v = t.bagss();
        let n = self.cts.n();
        for (_, ci) in self.ci_fields_mut() {
            ci.n = n;
        }
    }

    /// Fills the normal-approximation bounds for every alpha level.
    ///
    /// FBIAS, GSS, HSS and BAGSS have no closed-form interval and keep
    /// missing normal bounds.
    pub fn compute_ci(&mut self) {
        let t = &self.cts;
        for (i, &a) in self.alpha.iter().enumerate() {
            self.baser.set_normal(i, t.baser_ci(a, self.baser.vif));
            self.fmean.set_normal(i, t.fmean_ci(a, self.fmean.vif));
            self.acc.set_normal(i, t.accuracy_ci(a, self.acc.vif));
            self.pody.set_normal(i, t.pod_yes_ci(a, self.pody.vif));
            self.podn.set_normal(i, t.pod_no_ci(a, self.podn.vif));
            self.pofd.set_normal(i, t.pofd_ci(a, self.pofd.vif));
            self.far.set_normal(i, t.far_ci(a, self.far.vif));
            self.csi.set_normal(i, t.csi_ci(a, self.csi.vif));
            self.hk.set_normal(i, t.hk_ci(a, self.hk.vif));
            self.odds.set_normal(i, t.odds_ci(a));
            self.lodds.set_normal(i, t.lodds_ci(a));
            self.orss.set_normal(i, t.orss_ci(a));
            self.eds.set_normal(i, t.eds_ci(a));
            self.seds.set_normal(i, t.seds_ci(a));
            self.edi.set_normal(i, t.edi_ci(a));
            self.sedi.set_normal(i, t.sedi_ci(a));
        }
    }
}

impl StatFamily for CtsInfo {
    type Pairs = PairData;

    const NAME: &'static str = "CTS";

    fn n_pairs(pairs: &PairData) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.cts.n()
    }

    ci_fields! {
        "BASER" => baser,
        "FMEAN" => fmean,
        "ACC" => acc,
        "FBIAS" => fbias,
        "PODY" => pody,
        "PODN" => podn,
        "POFD" => pofd,
        "FAR" => far,
        "CSI" => csi,
        "GSS" => gss,
        "HK" => hk,
        "HSS" => hss,
        "ODDS" => odds,
        "LODDS" => lodds,
        "ORSS" => orss,
        "EDS" => eds,
        "SEDS" => seds,
        "EDI" => edi,
        "SEDI" => sedi,
        "BAGSS" => bagss,
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        let t = &self.cts;
        vec![
            ("FY_OY", Some(t.fy_oy() as f64)),
            ("FY_ON", Some(t.fy_on() as f64)),
            ("FN_OY", Some(t.fn_oy() as f64)),
            ("FN_ON", Some(t.fn_on() as f64)),
            ("F_RATE", t.f_rate()),
            ("H_RATE", t.h_rate()),
            ("O_RATE", t.o_rate()),
        ]
    }

    fn replicate(&self, pairs: &PairData, indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(self.fthresh, self.othresh, &self.alpha)?;
        out.set_pairs(pairs, indices)?;
        out.compute_stats();
        Ok(out)
    }
}
