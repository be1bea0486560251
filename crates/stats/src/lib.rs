//! Numeric helpers shared by the verification crates.
//!
//! Plain functions over slices and partial sums. Undefined results are
//! `None` rather than a sentinel value, so callers can propagate missing
//! statistics with `?` or `Option::map`.

mod dist;
mod rank;
mod sums;

pub use dist::{
    chi_squared_quantile, lambert_w0, normal_cdf, normal_quantile, students_t_quantile,
};
pub use rank::{Concordance, RankedArray, average_ranks, concordance};
pub use sums::{compute_corr, compute_stdev};

/// Tolerance used for floating-point equality tests throughout the workspace.
pub const EQ_TOL: f64 = 1e-10;

/// Returns true when `a` and `b` differ by less than [`EQ_TOL`].
pub fn is_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EQ_TOL
}

/// Linear-interpolation quantile (R type 7) of pre-sorted data.
///
/// **Expects pre-sorted input** (caller's responsibility). `p` is clamped
/// to `[0, 1]`.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn quantile_type7(sorted: &[f64], p: f64) -> f64 {
    assert!(
        !sorted.is_empty(),
        "quantile_type7: input must not be empty"
    );
    let p = p.clamp(0.0, 1.0);
    let n = sorted.len();
    let h = (n - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = (lo + 1).min(n - 1);
    sorted[lo] + (h - h.floor()) * (sorted[hi] - sorted[lo])
}

/// Sorts a copy of `data` (NaN-tolerant total order).
pub fn sorted_copy(data: &[f64]) -> Vec<f64> {
    let mut sorted = data.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Median of pre-sorted data. For even length, averages the middle two values.
///
/// # Panics
///
/// Panics if `sorted` is empty.
pub fn median(sorted: &[f64]) -> f64 {
    assert!(!sorted.is_empty(), "median: input must not be empty");
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Median absolute deviation from the median (constant = 1).
pub fn median_abs_deviation(data: &[f64]) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    let med = median(&sorted_copy(data));
    let devs: Vec<f64> = data.iter().map(|&x| (x - med).abs()).collect();
    Some(median(&sorted_copy(&devs)))
}
