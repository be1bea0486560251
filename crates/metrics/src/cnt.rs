//! Continuous statistics: moments, correlations, error measures and error
//! percentiles.

use serde::Serialize;
use tracing::warn;
use verif_contable::Interval;
use verif_stats::{
    average_ranks, chi_squared_quantile, compute_corr, compute_stdev, concordance, is_eq,
    median_abs_deviation, normal_quantile, quantile_type7, sorted_copy, students_t_quantile,
};

use crate::ci_info::{CiInfo, check_alpha};
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::PairData;
use crate::sl1l2::Sl1l2Info;

/// Default largest sample for which rank correlations are computed.
pub const DEFAULT_RANK_CORR_MAX: usize = 5000;

/// Both values below this count as "no precipitation" when the
/// precipitation flag is set.
const PRECIP_ZERO: f64 = 0.0001;

/// Samples smaller than this use Student-t critical values.
const SMALL_SAMPLE: usize = 30;

/// Pairs held for the continuous statistics.
#[derive(Debug, Clone, PartialEq, Default)]
struct Sample {
    f: Vec<f64>,
    o: Vec<f64>,
    climo: Vec<Option<f64>>,
    w: Vec<f64>,
}

impl Sample {
    fn len(&self) -> usize {
        self.f.len()
    }

    fn clear(&mut self) {
        self.f.clear();
        self.o.clear();
        self.climo.clear();
        self.w.clear();
    }

    fn normalized_weights(&self) -> Vec<f64> {
        let total: f64 = self.w.iter().sum();
        if total > 0.0 {
            self.w.iter().map(|w| w / total).collect()
        } else {
            vec![1.0 / self.len().max(1) as f64; self.len()]
        }
    }
}

/// Continuous forecast verification statistics.
///
/// Moments, Pearson and anomaly correlations and the error measures are
/// weighted by the pair weights. Error percentiles, MAD and the rank
/// correlations are unweighted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CntInfo {
    alpha: Vec<f64>,
    rank_corr_flag: bool,
    rank_corr_max: usize,
    precip_flag: bool,
    #[serde(skip)]
    sample: Sample,
    n: u64,
    n_ranks: Option<u64>,
    frank_ties: Option<u64>,
    orank_ties: Option<u64>,

    /// Mean forecast.
    pub fbar: CiInfo,
    /// Forecast standard deviation.
    pub fstdev: CiInfo,
    /// Mean observation.
    pub obar: CiInfo,
    /// Observation standard deviation.
    pub ostdev: CiInfo,
    /// Pearson correlation.
    pub pr_corr: CiInfo,
    /// Spearman rank correlation.
    pub sp_corr: Option<f64>,
    /// Kendall's tau-b.
    pub kt_corr: Option<f64>,
    /// Centered anomaly correlation.
    pub anom_corr: CiInfo,
    /// Uncentered anomaly correlation.
    pub anom_corr_uncntr: CiInfo,
    /// Root mean squared forecast anomaly.
    pub rmsfa: CiInfo,
    /// Root mean squared observation anomaly.
    pub rmsoa: CiInfo,
    /// Mean error.
    pub me: CiInfo,
    /// Squared mean error.
    pub me2: CiInfo,
    /// Standard deviation of the error.
    pub estdev: CiInfo,
    /// Multiplicative bias.
    pub mbias: CiInfo,
    /// Mean absolute error.
    pub mae: CiInfo,
    /// Mean squared error.
    pub mse: CiInfo,
    /// Mean squared error skill score against the observation variance.
    pub msess: CiInfo,
    /// Bias-corrected mean squared error.
    pub bcmse: CiInfo,
    /// Root mean squared error.
    pub rmse: CiInfo,
    /// 10th percentile of the error.
    pub e10: CiInfo,
    /// 25th percentile of the error.
    pub e25: CiInfo,
    /// Median error.
    pub e50: CiInfo,
    /// 75th percentile of the error.
    pub e75: CiInfo,
    /// 90th percentile of the error.
    pub e90: CiInfo,
    /// Interquartile range of the error.
    pub eiqr: CiInfo,
    /// Median absolute deviation of the error.
    pub mad: CiInfo,
}

impl CntInfo {
    /// Creates an empty family. Rank correlations are off by default.
    pub fn new(alpha: &[f64]) -> Result<Self, MetricsError> {
        let alpha = check_alpha(alpha)?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            alpha,
            rank_corr_flag: false,
            rank_corr_max: DEFAULT_RANK_CORR_MAX,
            precip_flag: false,
            sample: Sample::default(),
            n: 0,
            n_ranks: None,
            frank_ties: None,
            orank_ties: None,
            fbar: ci.clone(),
            fstdev: ci.clone(),
            obar: ci.clone(),
            ostdev: ci.clone(),
            pr_corr: ci.clone(),
            sp_corr: None,
            kt_corr: None,
            anom_corr: ci.clone(),
            anom_corr_uncntr: ci.clone(),
            rmsfa: ci.clone(),
            rmsoa: ci.clone(),
            me: ci.clone(),
            me2: ci.clone(),
            estdev: ci.clone(),
            mbias: ci.clone(),
            mae: ci.clone(),
            mse: ci.clone(),
            msess: ci.clone(),
            bcmse: ci.clone(),
            rmse: ci.clone(),
            e10: ci.clone(),
            e25: ci.clone(),
            e50: ci.clone(),
            e75: ci.clone(),
            e90: ci.clone(),
            eiqr: ci.clone(),
            mad: ci,
        })
    }

    /// Enables Spearman and Kendall rank correlations.
    pub fn with_rank_corr(mut self, flag: bool) -> Self {
        self.rank_corr_flag = flag;
        self
    }

    /// Largest sample for which rank correlations are computed.
    pub fn with_rank_corr_max(mut self, max: usize) -> Self {
        self.rank_corr_max = max;
        self
    }

    /// Excludes pairs where both values are (near) zero from the rank
    /// correlations.
    pub fn with_precip_flag(mut self, flag: bool) -> Self {
        self.precip_flag = flag;
        self
    }

    // --- Accessors ---

    /// True when rank correlations are enabled.
    pub fn rank_corr_flag(&self) -> bool {
        self.rank_corr_flag
    }

    /// Largest sample for rank correlations.
    pub fn rank_corr_max(&self) -> usize {
        self.rank_corr_max
    }

    /// True when the precipitation mask is applied to rank correlations.
    pub fn precip_flag(&self) -> bool {
        self.precip_flag
    }

    /// Number of ranked pairs, when ranks were computed.
    pub fn n_ranks(&self) -> Option<u64> {
        self.n_ranks
    }

    /// Tie groups among the forecast ranks.
    pub fn frank_ties(&self) -> Option<u64> {
        self.frank_ties
    }

    /// Tie groups among the observation ranks.
    pub fn orank_ties(&self) -> Option<u64> {
        self.orank_ties
    }

    /// Drops every held pair and marks every statistic missing.
    pub fn clear(&mut self) {
        self.sample.clear();
        self.n = 0;
        self.reset_stats();
    }

    fn reset_stats(&mut self) {
        self.sp_corr = None;
        self.kt_corr = None;
        self.n_ranks = None;
        self.frank_ties = None;
        self.orank_ties = None;
        for (_, ci) in self.ci_fields_mut() {
            ci.set_bad_data();
            ci.n = 0;
        }
    }

    /// Adds one pair with unit weight.
    pub fn add(&mut self, f: f64, o: f64, climo_mean: Option<f64>) {
        self.sample.f.push(f);
        self.sample.o.push(o);
        self.sample.climo.push(climo_mean);
        self.sample.w.push(1.0);
    }

    /// Replaces the held pairs with those at `indices`, weights included.
    pub fn set_pairs(&mut self, pairs: &PairData, indices: &[usize]) -> Result<(), MetricsError> {
        pairs.check_indices(indices)?;
        self.sample.clear();
        let (f, o, w) = (pairs.fcst(), pairs.obs(), pairs.weights());
        for &j in indices {
            self.sample.f.push(f[j]);
            self.sample.o.push(o[j]);
            self.sample.climo.push(pairs.climo_mean(j));
            self.sample.w.push(w[j]);
        }
        Ok(())
    }

    /// Derives every point statistic from the held pairs.
    ///
    /// Anomaly statistics need a climatological mean for every pair.
    pub fn compute_stats(&mut self) {
        self.reset_stats();
        let n = self.sample.len();
        self.n = n as u64;
        if n == 0 {
            return;
        }
        let s = &self.sample;
        let w = s.normalized_weights();

        let mut fbar = 0.0;
        let mut obar = 0.0;
        let mut ffbar = 0.0;
        let mut oobar = 0.0;
        let mut fobar = 0.0;
        let mut err_bar = 0.0;
        let mut abs_err_bar = 0.0;
        let mut err_sq_bar = 0.0;
        for i in 0..n {
            let (f, o) = (s.f[i], s.o[i]);
            let err = f - o;
            fbar += w[i] * f;
            obar += w[i] * o;
            ffbar += w[i] * f * f;
            oobar += w[i] * o * o;
            fobar += w[i] * f * o;
            err_bar += w[i] * err;
            abs_err_bar += w[i] * err.abs();
            err_sq_bar += w[i] * err * err;
        }
        let nf = n as f64;

        self.fbar.v = Some(fbar);
        self.obar.v = Some(obar);
        self.fstdev.v = compute_stdev(fbar * nf, ffbar * nf, n);
        self.ostdev.v = compute_stdev(obar * nf, oobar * nf, n);
        self.mbias.v = (!is_eq(obar, 0.0)).then(|| fbar / obar);
        self.pr_corr.v = compute_corr(fbar * nf, obar * nf, ffbar * nf, oobar * nf, fobar * nf, n);

        self.me.v = Some(err_bar);
        self.me2.v = Some(err_bar * err_bar);
        self.estdev.v = compute_stdev(err_bar * nf, err_sq_bar * nf, n);
        self.mae.v = Some(abs_err_bar);
        self.mse.v = Some(err_sq_bar);
        self.bcmse.v = Some(err_sq_bar - (fbar - obar) * (fbar - obar));
        self.rmse.v = Some(err_sq_bar.sqrt());
        self.msess.v = self.ostdev.v.and_then(|sd| {
            let var = sd * sd;
            (!is_eq(var, 0.0)).then(|| 1.0 - err_sq_bar / var)
        });

        let err: Vec<f64> = s.f.iter().zip(&s.o).map(|(f, o)| f - o).collect();
        let climo: Option<Vec<f64>> = s.climo.iter().copied().collect();
        let sorted = sorted_copy(&err);
        let pct = |p: f64| Some(quantile_type7(&sorted, p));
        self.e10.v = pct(0.10);
        self.e25.v = pct(0.25);
        self.e50.v = pct(0.50);
        self.e75.v = pct(0.75);
        self.e90.v = pct(0.90);
        self.eiqr.v = Some(quantile_type7(&sorted, 0.75) - quantile_type7(&sorted, 0.25));
        self.mad.v = median_abs_deviation(&err);

        if let Some(climo) = climo {
            self.compute_anomaly_stats(&climo, &w);
        }

        if self.rank_corr_flag {
            self.compute_rank_corr();
        }

        let count = self.n;
        for (_, ci) in self.ci_fields_mut() {
            ci.n = count;
        }
    }

    fn compute_anomaly_stats(&mut self, climo: &[f64], w: &[f64]) {
        let s = &self.sample;
        let n = s.len();
        let nf = n as f64;
        let mut fa = 0.0;
        let mut oa = 0.0;
        let mut ffa = 0.0;
        let mut ooa = 0.0;
        let mut foa = 0.0;
        for i in 0..n {
            let a = s.f[i] - climo[i];
            let b = s.o[i] - climo[i];
            fa += w[i] * a;
            oa += w[i] * b;
            ffa += w[i] * a * a;
            ooa += w[i] * b * b;
            foa += w[i] * a * b;
        }
        self.anom_corr.v = compute_corr(fa * nf, oa * nf, ffa * nf, ooa * nf, foa * nf, n);
        self.rmsfa.v = Some(ffa.sqrt());
        self.rmsoa.v = Some(ooa.sqrt());
        self.anom_corr_uncntr.v = uncentered_corr(foa, ffa, ooa);
    }

    fn compute_rank_corr(&mut self) {
        let s = &self.sample;
        let (f, o): (Vec<f64>, Vec<f64>) = s
            .f
            .iter()
            .zip(&s.o)
            .filter(|&(&f, &o)| !(self.precip_flag && f < PRECIP_ZERO && o < PRECIP_ZERO))
            .map(|(&f, &o)| (f, o))
            .unzip();
        let n = f.len();
        if n > self.rank_corr_max {
            warn!(
                n,
                max = self.rank_corr_max,
                "skipping rank correlations for a large sample"
            );
            return;
        }

        let fr = average_ranks(&f);
        let or = average_ranks(&o);
        let (f_sum, o_sum, ff, oo, fo) = fr.ranks().iter().zip(or.ranks()).fold(
            (0.0, 0.0, 0.0, 0.0, 0.0),
            |(a, b, c, d, e), (&x, &y)| (a + x, b + y, c + x * x, d + y * y, e + x * y),
        );
        self.sp_corr = compute_corr(f_sum, o_sum, ff, oo, fo, n);
        self.kt_corr = concordance(fr.ranks(), or.ranks()).kendall_tau();
        self.n_ranks = Some(n as u64);
        self.frank_ties = Some(fr.ties() as u64);
        self.orank_ties = Some(or.ties() as u64);
    }

    /// Derives the statistics from partial sums instead of pairs.
    ///
    /// With `aflag` the anomaly sums are used and the anomaly correlation,
    /// RMSFA, RMSOA and the uncentered anomaly correlation are filled in place
    /// of the Pearson correlation. Percentile statistics and rank
    /// correlations stay missing. Normal-approximation bounds are filled.
    pub fn from_sl1l2(s: &Sl1l2Info, aflag: bool, alpha: &[f64]) -> Result<Self, MetricsError> {
        let mut out = Self::new(alpha)?;
        let (n, fbar, obar, fobar, ffbar, oobar, mae) = if aflag {
            (s.sacount, s.fabar, s.oabar, s.foabar, s.ffabar, s.ooabar, s.samae)
        } else {
            (s.scount, s.fbar, s.obar, s.fobar, s.ffbar, s.oobar, s.smae)
        };
        out.n = n;
        if n == 0 {
            return Ok(out);
        }
        let count = n as usize;
        let nf = n as f64;

        out.fbar.v = Some(fbar);
        out.obar.v = Some(obar);
        out.fstdev.v = compute_stdev(fbar * nf, ffbar * nf, count);
        out.ostdev.v = compute_stdev(obar * nf, oobar * nf, count);
        out.mbias.v = (!is_eq(obar, 0.0)).then(|| fbar / obar);

        let corr = compute_corr(fbar * nf, obar * nf, ffbar * nf, oobar * nf, fobar * nf, count);
        if aflag {
            out.anom_corr.v = corr;
            out.rmsfa.v = Some(ffbar.sqrt());
            out.rmsoa.v = Some(oobar.sqrt());
            out.anom_corr_uncntr.v = uncentered_corr(fobar, ffbar, oobar);
        } else {
            out.pr_corr.v = corr;
        }

        let me = fbar - obar;
        let mse = ffbar + oobar - 2.0 * fobar;
        out.me.v = Some(me);
        out.me2.v = Some(me * me);
        out.mae.v = Some(mae);
        out.estdev.v = compute_stdev(me * nf, mse * nf, count);
        if mse < 0.0 && !is_eq(mse, 0.0) {
            warn!(mse, "negative mean squared error from partial sums");
        } else {
            let mse = mse.max(0.0);
            out.mse.v = Some(mse);
            out.rmse.v = Some(mse.sqrt());
            out.bcmse.v = Some(mse - me * me);
            out.msess.v = out.ostdev.v.and_then(|sd| {
                let var = sd * sd;
                (!is_eq(var, 0.0)).then(|| 1.0 - mse / var)
            });
        }

        for (_, ci) in out.ci_fields_mut() {
            ci.n = n;
        }
        out.compute_ci();
        Ok(out)
    }

    /// Fills the normal-approximation bounds for every alpha level.
    ///
    /// Means use Student-t critical values below 30 pairs and standard
    /// normal ones above, standard deviations use Chi-squared bounds and
    /// correlations use the Fisher z transform.
    pub fn compute_ci(&mut self) {
        let n = self.n as usize;
        for i in 0..self.alpha.len() {
            let a = self.alpha[i];
            let cv = mean_critical_values(a, n);
            let fbar = mean_ci(&self.fbar, self.fstdev.v, cv, n);
            self.fbar.set_normal(i, fbar);
            let obar = mean_ci(&self.obar, self.ostdev.v, cv, n);
            self.obar.set_normal(i, obar);
            let me = mean_ci(&self.me, self.estdev.v, cv, n);
            self.me.set_normal(i, me);
            let fstdev = stdev_ci(&self.fstdev, a, n);
            self.fstdev.set_normal(i, fstdev);
            let ostdev = stdev_ci(&self.ostdev, a, n);
            self.ostdev.set_normal(i, ostdev);
            let estdev = stdev_ci(&self.estdev, a, n);
            self.estdev.set_normal(i, estdev);
            let pr = fisher_ci(self.pr_corr.v, a, n);
            self.pr_corr.set_normal(i, pr);
            let anom = fisher_ci(self.anom_corr.v, a, n);
            self.anom_corr.set_normal(i, anom);
        }
    }
}

/// `fo / sqrt(ff·oo)`, clamped to `[-1, 1]`.
fn uncentered_corr(fo: f64, ff: f64, oo: f64) -> Option<f64> {
    let den = ff * oo;
    if den <= 0.0 || is_eq(den, 0.0) {
        return None;
    }
    Some((fo / den.sqrt()).clamp(-1.0, 1.0))
}

/// Lower and upper critical values for a mean: Student-t with n-1 degrees
/// of freedom for small samples, standard normal otherwise.
pub(crate) fn mean_critical_values(alpha: f64, n: usize) -> Option<(f64, f64)> {
    if n <= 1 {
        return None;
    }
    if n < SMALL_SAMPLE {
        let df = (n - 1) as f64;
        Some((
            students_t_quantile(alpha / 2.0, df)?,
            students_t_quantile(1.0 - alpha / 2.0, df)?,
        ))
    } else {
        Some((
            normal_quantile(alpha / 2.0)?,
            normal_quantile(1.0 - alpha / 2.0)?,
        ))
    }
}

pub(crate) fn mean_ci(
    ci: &CiInfo,
    stdev: Option<f64>,
    cv: Option<(f64, f64)>,
    n: usize,
) -> Option<Interval> {
    let (v, sd, (cv_l, cv_u)) = (ci.v?, stdev?, cv?);
    let se = (ci.vif * sd * sd).sqrt() / (n as f64).sqrt();
    Some(Interval::new(v + cv_l * se, v + cv_u * se))
}

pub(crate) fn stdev_ci(ci: &CiInfo, alpha: f64, n: usize) -> Option<Interval> {
    let sd = ci.v?;
    if n <= 1 {
        return None;
    }
    let df = (n - 1) as f64;
    let var = ci.vif * sd * sd;
    let chi_u = chi_squared_quantile(1.0 - alpha / 2.0, df)?;
    let chi_l = chi_squared_quantile(alpha / 2.0, df)?;
    if chi_l <= 0.0 {
        return None;
    }
    Some(Interval::new((df * var / chi_u).sqrt(), (df * var / chi_l).sqrt()))
}

/// Fisher z interval for a correlation. `None` for `n <= 3` or `|r| = 1`.
fn fisher_ci(r: Option<f64>, alpha: f64, n: usize) -> Option<Interval> {
    let r = r?;
    if n <= 3 || is_eq(r.abs(), 1.0) {
        return None;
    }
    let z = 0.5 * ((1.0 + r) / (1.0 - r)).ln();
    let se = 1.0 / ((n - 3) as f64).sqrt();
    let cv_l = normal_quantile(alpha / 2.0)?;
    let cv_u = normal_quantile(1.0 - alpha / 2.0)?;
    Some(Interval::new((z + cv_l * se).tanh(), (z + cv_u * se).tanh()))
}

impl StatFamily for CntInfo {
    type Pairs = PairData;

    const NAME: &'static str = "CNT";

    fn n_pairs(pairs: &PairData) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.n
    }

    ci_fields! {
        "FBAR" => fbar,
        "FSTDEV" => fstdev,
        "OBAR" => obar,
        "OSTDEV" => ostdev,
        "PR_CORR" => pr_corr,
        "ME" => me,
        "ESTDEV" => estdev,
        "MBIAS" => mbias,
        "MAE" => mae,
        "MSE" => mse,
        "BCMSE" => bcmse,
        "RMSE" => rmse,
        "E10" => e10,
        "E25" => e25,
        "E50" => e50,
        "E75" => e75,
        "E90" => e90,
        "EIQR" => eiqr,
        "MAD" => mad,
        "ANOM_CORR" => anom_corr,
        "ANOM_CORR_UNCNTR" => anom_corr_uncntr,
        "ME2" => me2,
        "MSESS" => msess,
        "RMSFA" => rmsfa,
        "RMSOA" => rmsoa,
    }

    fn extra_stats(&self) -> Vec<(&'static str, Option<f64>)> {
        vec![
            ("SP_CORR", self.sp_corr),
            ("KT_CORR", self.kt_corr),
            ("RANKS", self.n_ranks.map(|v| v as f64)),
            ("FRANK_TIES", self.frank_ties.map(|v| v as f64)),
            ("ORANK_TIES", self.orank_ties.map(|v| v as f64)),
        ]
    }

    fn replicate(&self, pairs: &PairData, indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(&self.alpha)?
            .with_rank_corr(false)
            .with_rank_corr_max(self.rank_corr_max)
            .with_precip_flag(self.precip_flag);
        out.set_pairs(pairs, indices)?;
        out.compute_stats();
        Ok(out)
    }
}
