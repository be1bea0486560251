//! Jackknife and bootstrap passes over a statistic family.
//!
//! The engine never looks inside a family: it recomputes the family on
//! index subsets through [`StatFamily::replicate`], reads the point values
//! of its `ci_fields`, and writes the bootstrap bounds back through
//! `ci_fields_mut`.
//!
//! Index sets are drawn sequentially from one sampler so a seeded run is
//! reproducible; replicates are then evaluated in parallel.

use rand::rngs::StdRng;
use rayon::prelude::*;
use tracing::{debug, debug_span, info};
use verif_metrics::{Interval, StatFamily};

use crate::config::{Method, ResampleConfig};
use crate::error::ResampleError;
use crate::interval::{compute_bca_interval, compute_perc_interval};
use crate::result::{ResampleSummary, StatCounts};
use crate::sampler::{IndexSampler, RngSampler};

/// Resampling engine holding one random stream across families.
///
/// # Example
///
/// ```
/// use verif_metrics::{MeanStdev, StatFamily};
/// use verif_resample::{Method, ResampleConfig, ResampleEngine};
///
/// let values: Vec<f64> = (0..50).map(|i| (i % 7) as f64).collect();
/// let all: Vec<usize> = (0..values.len()).collect();
/// let mut ms = MeanStdev::new(&[0.05]).unwrap();
/// ms.set_values(&values, &all).unwrap();
///
/// let config = ResampleConfig::new()
///     .with_method(Method::Percentile)
///     .with_n_rep(200)
///     .with_seed(Some(1));
/// let mut engine = ResampleEngine::new(config).unwrap();
/// engine.compute(&mut ms, &values).unwrap();
/// assert!(ms.mean.bootstrap(0).is_some());
/// ```
#[derive(Debug)]
pub struct ResampleEngine {
    config: ResampleConfig,
    sampler: RngSampler<StdRng>,
}

impl ResampleEngine {
    /// Validates `config` and seeds the random stream from it.
    pub fn new(config: ResampleConfig) -> Result<Self, ResampleError> {
        config.validate()?;
        let sampler = RngSampler::from_seed(config.seed());
        Ok(Self { config, sampler })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Fills the bootstrap bounds of every statistic in `family`.
    pub fn compute<F: StatFamily>(
        &mut self,
        family: &mut F,
        pairs: &F::Pairs,
    ) -> Result<ResampleSummary, ResampleError> {
        resample_family(family, pairs, &self.config, &mut self.sampler)
    }
}

/// Fills the bootstrap bounds of every statistic in `family` at each of its
/// alpha levels, drawing index sets from `sampler`.
///
/// With fewer than two pairs, or zero replicates, nothing is resampled and
/// the bounds are left missing. A statistic whose replicates are all
/// undefined gets missing bounds; the others are unaffected.
///
/// # Errors
///
/// Returns [`ResampleError::InvalidConfig`] for an invalid configuration and
/// [`ResampleError::Metrics`] when the family fails to recompute.
pub fn resample_family<F, S>(
    family: &mut F,
    pairs: &F::Pairs,
    config: &ResampleConfig,
    sampler: &mut S,
) -> Result<ResampleSummary, ResampleError>
where
    F: StatFamily,
    S: IndexSampler + ?Sized,
{
    config.validate()?;
    let n = F::n_pairs(pairs);
    let n_rep = config.n_rep();
    let alpha = family.alpha().to_vec();

    for (_, ci) in family.ci_fields_mut() {
        for i in 0..alpha.len() {
            ci.set_bootstrap(i, None);
        }
    }
    if n <= 1 || n_rep == 0 {
        debug!(family = F::NAME, n, n_rep, "too few pairs or replicates; skipping");
        return Ok(ResampleSummary::skipped(F::NAME, n));
    }
    let _span = debug_span!("resample", family = F::NAME, n, n_rep).entered();

    let all: Vec<usize> = (0..n).collect();
    let fam: &F = family;
    let point = fam.replicate(pairs, &all)?.ci_values();

    // --- Jackknife (BCa only) ---
    let jack: Vec<Vec<Option<f64>>> = match config.method() {
        Method::Bca => (0..n)
            .into_par_iter()
            .map(|skip| {
                let idx: Vec<usize> = (0..n).filter(|&i| i != skip).collect();
                fam.replicate(pairs, &idx).map(|r| r.ci_values())
            })
            .collect::<Result<Vec<_>, _>>()?,
        Method::Percentile => Vec::new(),
    };

    // --- Bootstrap ---
    let m = config.replicate_size(n);
    let index_sets: Vec<Vec<usize>> = (0..n_rep)
        .map(|_| {
            if config.replace() {
                sampler.sample_with_replacement(n, m)
            } else {
                sampler.sample_without_replacement(n, m)
            }
        })
        .collect();
    let boot: Vec<Vec<Option<f64>>> = index_sets
        .par_iter()
        .map(|idx| fam.replicate(pairs, idx).map(|r| r.ci_values()))
        .collect::<Result<Vec<_>, _>>()?;

    let mut counts = Vec::with_capacity(point.len());
    for (k, (name, ci)) in family.ci_fields_mut().into_iter().enumerate() {
        let jack_k = column(&jack, k);
        let boot_k = column(&boot, k);
        for (i, &a) in alpha.iter().enumerate() {
            let interval: Option<Interval> = match config.method() {
                Method::Bca => point
                    .get(k)
                    .copied()
                    .flatten()
                    .and_then(|s| compute_bca_interval(s, &jack_k, &boot_k, a)),
                Method::Percentile => compute_perc_interval(&boot_k, a),
            };
            ci.set_bootstrap(i, interval);
        }
        if boot_k.len() < n_rep {
            debug!(
                stat = name,
                valid = boot_k.len(),
                n_rep,
                "undefined replicates dropped"
            );
        }
        counts.push(StatCounts {
            name,
            n_jack: jack_k.len(),
            n_boot: boot_k.len(),
        });
    }

    info!(family = F::NAME, n, n_rep, m, "bootstrap intervals computed");
    Ok(ResampleSummary::new(F::NAME, n, n_rep, counts))
}

/// Defined values of statistic `k` across replicates.
fn column(rows: &[Vec<Option<f64>>], k: usize) -> Vec<f64> {
    rows.iter()
        .filter_map(|r| r.get(k).copied().flatten())
        .filter(|v| v.is_finite())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use verif_metrics::MeanStdev;

    fn mean_stdev(values: &[f64]) -> MeanStdev {
        let all: Vec<usize> = (0..values.len()).collect();
        let mut ms = MeanStdev::new(&[0.05, 0.10]).unwrap();
        ms.set_values(values, &all).unwrap();
        ms
    }

    #[test]
    fn single_pair_is_skipped() {
        let values = [3.0];
        let mut ms = mean_stdev(&values);
        let mut engine = ResampleEngine::new(ResampleConfig::new().with_seed(Some(1))).unwrap();
        let summary = engine.compute(&mut ms, &values).unwrap();
        assert!(summary.is_skipped());
        assert!(ms.mean.bootstrap(0).is_none());
    }

    #[test]
    fn zero_replicates_is_skipped() {
        let values = [1.0, 2.0, 3.0];
        let mut ms = mean_stdev(&values);
        let cfg = ResampleConfig::new().with_n_rep(0);
        let mut sampler = RngSampler::from_seed(Some(1));
        let summary = resample_family(&mut ms, &values[..], &cfg, &mut sampler).unwrap();
        assert!(summary.is_skipped());
    }

    #[test]
    fn invalid_config_is_rejected() {
        assert!(ResampleEngine::new(ResampleConfig::new().with_m_prop(2.0)).is_err());
    }

    #[test]
    fn every_alpha_slot_is_filled() {
        let values: Vec<f64> = (0..40).map(|i| ((i * 37) % 11) as f64).collect();
        let mut ms = mean_stdev(&values);
        let mut engine = ResampleEngine::new(ResampleConfig::new().with_n_rep(300).with_seed(Some(9)))
            .unwrap();
        let summary = engine.compute(&mut ms, &values).unwrap();
        assert_eq!(summary.n_rep(), 300);
        assert_eq!(summary.stat("MEAN").map(|c| c.n_jack), Some(40));
        let wide = ms.mean.bootstrap(0).unwrap();
        let narrow = ms.mean.bootstrap(1).unwrap();
        assert!(wide.lower <= narrow.lower && narrow.upper <= wide.upper);
        assert!(wide.lower < ms.mean.v.unwrap() && ms.mean.v.unwrap() < wide.upper);
    }

    #[test]
    fn constant_sample_leaves_bca_bounds_missing() {
        // Every jackknife value equals the mean, so the acceleration is undefined.
        let values = [2.0; 10];
        let mut ms = mean_stdev(&values);
        let mut engine = ResampleEngine::new(ResampleConfig::new().with_n_rep(50).with_seed(Some(3)))
            .unwrap();
        engine.compute(&mut ms, &values).unwrap();
        assert!(ms.mean.bootstrap(0).is_none());
    }

    #[test]
    fn column_drops_missing() {
        let rows = vec![vec![Some(1.0), None], vec![None, Some(2.0)], vec![Some(f64::NAN), Some(3.0)]];
        assert_eq!(column(&rows, 0), vec![1.0]);
        assert_eq!(column(&rows, 1), vec![2.0, 3.0]);
        assert!(column(&rows, 5).is_empty());
    }
}
