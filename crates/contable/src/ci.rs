//! Normal-approximation confidence intervals for proportions, odds ratios
//! and the Hanssen-Kuipers discriminant.
//!
//! Formulas follow Wilks, *Statistical Methods in the Atmospheric Sciences*
//! (2nd ed., pp. 327-328). Every function returns `None` when the interval
//! is undefined for its inputs.

use serde::Serialize;
use verif_stats::normal_quantile;

/// Lower and upper confidence bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Interval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound.
    pub upper: f64,
}

impl Interval {
    /// Creates an interval.
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    fn finite(self) -> Option<Self> {
        (self.lower.is_finite() && self.upper.is_finite()).then_some(self)
    }
}

/// Lower and upper standard normal critical values for `alpha`.
pub(crate) fn normal_critical_values(alpha: f64) -> Option<(f64, f64)> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return None;
    }
    Some((
        normal_quantile(alpha / 2.0)?,
        normal_quantile(1.0 - alpha / 2.0)?,
    ))
}

/// `v ± z·se` using standard normal critical values.
pub fn compute_normal_ci(v: f64, alpha: f64, se: f64) -> Option<Interval> {
    if !v.is_finite() || !se.is_finite() {
        return None;
    }
    let (cv_l, cv_u) = normal_critical_values(alpha)?;
    Interval::new(v + cv_l * se, v + cv_u * se).finite()
}

/// Confidence interval for a proportion. Uses the Wilson score method for
/// every sample size.
pub fn compute_proportion_ci(p: Option<f64>, n: u64, alpha: f64, vif: f64) -> Option<Interval> {
    compute_wilson_ci(p, n, alpha, vif)
}

/// Wald interval `p ± z·sqrt(vif·p(1-p)/n)`.
pub fn compute_wald_ci(p: Option<f64>, n: u64, alpha: f64, vif: f64) -> Option<Interval> {
    let p = p?;
    if n == 0 {
        return None;
    }
    let (cv_l, cv_u) = normal_critical_values(alpha)?;
    let v = vif * p * (1.0 - p) / n as f64;
    if v < 0.0 {
        return None;
    }
    Interval::new(p + cv_l * v.sqrt(), p + cv_u * v.sqrt()).finite()
}

/// Wilson score interval, with the binomial variance inflated by `vif`.
pub fn compute_wilson_ci(p: Option<f64>, n: u64, alpha: f64, vif: f64) -> Option<Interval> {
    let p = p?;
    if n == 0 {
        return None;
    }
    let (cv_l, cv_u) = normal_critical_values(alpha)?;
    let nf = n as f64;
    let bound = |z: f64| -> Option<f64> {
        let v = vif * p * (1.0 - p) / nf + z * z / (4.0 * nf * nf);
        if v < 0.0 {
            return None;
        }
        Some((p + z * z / (2.0 * nf) + z * v.sqrt()) / (1.0 + z * z / nf))
    };
    Interval::new(bound(cv_l)?, bound(cv_u)?).finite()
}

/// Woolf interval for the odds ratio: `odds·exp(z·sqrt(Σ 1/cell))`.
///
/// `None` when any cell is zero.
pub fn compute_woolf_ci(
    odds: Option<f64>,
    alpha: f64,
    fy_oy: u64,
    fy_on: u64,
    fn_oy: u64,
    fn_on: u64,
) -> Option<Interval> {
    let odds = odds?;
    if [fy_oy, fy_on, fn_oy, fn_on].contains(&0) {
        return None;
    }
    let (cv_l, cv_u) = normal_critical_values(alpha)?;
    let se = (1.0 / fy_oy as f64 + 1.0 / fy_on as f64 + 1.0 / fn_oy as f64 + 1.0 / fn_on as f64)
        .sqrt();
    Interval::new(odds * (cv_l * se).exp(), odds * (cv_u * se).exp()).finite()
}

/// Interval for the Hanssen-Kuipers discriminant from Wilson-style
/// variances of the hit rate and false alarm rate.
pub fn compute_hk_ci(
    hk: Option<f64>,
    alpha: f64,
    vif: f64,
    fy_oy: u64,
    fy_on: u64,
    fn_oy: u64,
    fn_on: u64,
) -> Option<Interval> {
    let hk = hk?;
    let h_n = fy_oy + fn_oy;
    let f_n = fy_on + fn_on;
    if h_n == 0 || f_n == 0 {
        return None;
    }
    let (cv, _) = normal_critical_values(alpha)?;
    let h = fy_oy as f64 / h_n as f64;
    let f = fy_on as f64 / f_n as f64;

    let wilson_sd = |rate: f64, n: u64| -> f64 {
        let n = n as f64;
        (rate * (1.0 - rate) / n + cv * cv / (4.0 * n * n)).sqrt() / (1.0 + cv * cv / n)
    };
    let h_sd = wilson_sd(h, h_n);
    let f_sd = wilson_sd(f, f_n);
    let stdev = (vif * (h_sd * h_sd + f_sd * f_sd)).sqrt();

    // cv is negative, so hk + cv·sd is the lower bound.
    Interval::new(hk + cv * stdev, hk - cv * stdev).finite()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn normal_ci_is_symmetric() {
        let ci = compute_normal_ci(1.0, 0.05, 0.5).unwrap();
        assert_relative_eq!(ci.lower, 1.0 - 1.959964 * 0.5, epsilon = 1e-6);
        assert_relative_eq!(ci.upper, 1.0 + 1.959964 * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn invalid_alpha_is_none() {
        assert!(compute_normal_ci(1.0, 0.0, 0.5).is_none());
        assert!(compute_normal_ci(1.0, 1.0, 0.5).is_none());
    }

    #[test]
    fn wilson_known_value() {
        // p=0.5, n=100, alpha=0.05: (0.5 ± 1.96*sqrt(0.0025+0.000096))/(1.0384)
        let ci = compute_wilson_ci(Some(0.5), 100, 0.05, 1.0).unwrap();
        assert_relative_eq!(ci.lower, 0.403832, epsilon = 1e-5);
        assert_relative_eq!(ci.upper, 0.596168, epsilon = 1e-5);
    }

    #[test]
    fn wilson_stays_inside_unit_interval_at_extremes() {
        let ci = compute_wilson_ci(Some(0.0), 20, 0.05, 1.0).unwrap();
        assert_relative_eq!(ci.lower, 0.0, epsilon = 1e-12);
        assert!(ci.upper > 0.0 && ci.upper < 1.0);
    }

    #[test]
    fn wilson_missing_or_empty() {
        assert!(compute_wilson_ci(None, 10, 0.05, 1.0).is_none());
        assert!(compute_wilson_ci(Some(0.3), 0, 0.05, 1.0).is_none());
    }

    #[test]
    fn wald_known_value() {
        let ci = compute_wald_ci(Some(0.5), 100, 0.05, 1.0).unwrap();
        assert_relative_eq!(ci.lower, 0.5 - 1.959964 * 0.05, epsilon = 1e-6);
        assert_relative_eq!(ci.upper, 0.5 + 1.959964 * 0.05, epsilon = 1e-6);
    }

    #[test]
    fn vif_widens_interval() {
        let narrow = compute_wald_ci(Some(0.3), 50, 0.05, 1.0).unwrap();
        let wide = compute_wald_ci(Some(0.3), 50, 0.05, 2.0).unwrap();
        assert!(wide.upper - wide.lower > narrow.upper - narrow.lower);
    }

    #[test]
    fn woolf_brackets_odds() {
        let ci = compute_woolf_ci(Some(45.3), 0.05, 28, 72, 23, 2680).unwrap();
        assert!(ci.lower < 45.3 && 45.3 < ci.upper);
        assert!(compute_woolf_ci(Some(1.0), 0.05, 0, 1, 1, 1).is_none());
    }

    #[test]
    fn hk_ci_brackets_value() {
        let ci = compute_hk_ci(Some(0.5229), 0.05, 1.0, 28, 72, 23, 2680).unwrap();
        assert!(ci.lower < 0.5229 && 0.5229 < ci.upper);
        assert!(compute_hk_ci(Some(0.1), 0.05, 1.0, 0, 3, 0, 4).is_none());
    }
}
