//! Distribution quantiles and the Lambert W function, bridged to `statrs`.

use statrs::distribution::{ChiSquared, ContinuousCDF, Normal, StudentsT};

const HALLEY_MAX_ITER: usize = 64;
const HALLEY_TOL: f64 = 1e-14;

/// Standard normal inverse CDF. `None` outside `[0, 1]`.
///
/// Returns `±inf` at exactly 0 or 1.
pub fn normal_quantile(p: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    Some(Normal::standard().inverse_cdf(p))
}

/// Standard normal CDF.
pub fn normal_cdf(x: f64) -> f64 {
    Normal::standard().cdf(x)
}

/// Student-t inverse CDF with `df` degrees of freedom.
pub fn students_t_quantile(p: f64, df: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    StudentsT::new(0.0, 1.0, df)
        .ok()
        .map(|dist| dist.inverse_cdf(p))
}

/// Chi-squared inverse CDF with `df` degrees of freedom.
pub fn chi_squared_quantile(p: f64, df: f64) -> Option<f64> {
    if !(0.0..=1.0).contains(&p) {
        return None;
    }
    ChiSquared::new(df).ok().map(|dist| dist.inverse_cdf(p))
}

/// Principal branch of the Lambert W function, `W0(x)` for `x >= -1/e`.
///
/// Solved by Halley iteration from a branch-point series or logarithmic
/// starting value.
pub fn lambert_w0(x: f64) -> Option<f64> {
    let branch = -(-1.0f64).exp();
    if !x.is_finite() || x < branch {
        return None;
    }
    if x == 0.0 {
        return Some(0.0);
    }
    if (x - branch).abs() < 1e-15 {
        return Some(-1.0);
    }

    let mut w = if x < 0.0 {
        let p = (2.0 * (std::f64::consts::E * x + 1.0)).sqrt();
        -1.0 + p - p * p / 3.0 + 11.0 / 72.0 * p * p * p
    } else if x < 3.0 {
        x.ln_1p()
    } else {
        let l = x.ln();
        l - l.ln()
    };

    for _ in 0..HALLEY_MAX_ITER {
        let ew = w.exp();
        let f = w * ew - x;
        let wp1 = w + 1.0;
        let denom = ew * wp1 - (w + 2.0) * f / (2.0 * wp1);
        if denom == 0.0 || !denom.is_finite() {
            break;
        }
        let step = f / denom;
        w -= step;
        if step.abs() <= HALLEY_TOL * (1.0 + w.abs()) {
            break;
        }
    }
    w.is_finite().then_some(w)
}
