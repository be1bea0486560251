//! Bootstrap interval estimators over replicate arrays.
//!
//! Both return `None` for an empty replicate array or when the interval is
//! undefined; they never panic on degenerate input.

use verif_metrics::Interval;
use verif_stats::{is_eq, normal_cdf, normal_quantile, quantile_type7, sorted_copy};

fn check_alpha(alpha: f64) -> Option<f64> {
    (alpha > 0.0 && alpha <= 1.0).then_some(alpha)
}

/// Bias-corrected and accelerated (BCa) bootstrap interval (Efron).
///
/// `s` is the full-sample statistic, `jack` the leave-one-out values and
/// `boot` the bootstrap replicates. `None` when either array is empty, when
/// the bias correction is infinite (no replicate on one side of `s`), or
/// when the jackknife values are all equal.
pub fn compute_bca_interval(s: f64, jack: &[f64], boot: &[f64], alpha: f64) -> Option<Interval> {
    let alpha = check_alpha(alpha)?;
    if jack.is_empty() || boot.is_empty() || !s.is_finite() {
        return None;
    }
    let sorted = sorted_copy(boot);

    let below = sorted.iter().filter(|&&v| v < s).count();
    let z_hat = normal_quantile(below as f64 / sorted.len() as f64)?;
    if !z_hat.is_finite() {
        return None;
    }

    let jack_mean = jack.iter().sum::<f64>() / jack.len() as f64;
    let (sum_sq, sum_cube) = jack.iter().fold((0.0, 0.0), |(sq, cu), &v| {
        let d = jack_mean - v;
        (sq + d * d, cu + d * d * d)
    });
    let den = 6.0 * sum_sq.powf(1.5);
    if is_eq(den, 0.0) {
        return None;
    }
    let a_hat = sum_cube / den;

    let adjust = |cv: f64| {
        let t = z_hat + cv;
        normal_cdf(z_hat + t / (1.0 - a_hat * t))
    };
    let a1 = adjust(normal_quantile(alpha / 2.0)?);
    let a2 = adjust(normal_quantile(1.0 - alpha / 2.0)?);
    if !a1.is_finite() || !a2.is_finite() {
        return None;
    }
    Some(Interval::new(
        quantile_type7(&sorted, a1),
        quantile_type7(&sorted, a2),
    ))
}

/// Percentile bootstrap interval: the `alpha/2` and `1 - alpha/2`
/// percentiles of the replicates.
pub fn compute_perc_interval(boot: &[f64], alpha: f64) -> Option<Interval> {
    let alpha = check_alpha(alpha)?;
    if boot.is_empty() {
        return None;
    }
    let sorted = sorted_copy(boot);
    Some(Interval::new(
        quantile_type7(&sorted, alpha / 2.0),
        quantile_type7(&sorted, 1.0 - alpha / 2.0),
    ))
}
