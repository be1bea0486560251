//! Moments from running partial sums.

use crate::is_eq;

/// Sample standard deviation from a running sum and sum of squares.
///
/// `sqrt((sum_sq - sum²/n) / (n - 1))`. A variance within tolerance of zero
/// yields 0; a negative variance or `n <= 1` yields `None`.
pub fn compute_stdev(sum: f64, sum_sq: f64, n: usize) -> Option<f64> {
    if n <= 1 {
        return None;
    }
    let nf = n as f64;
    let v = (sum_sq - sum * sum / nf) / (nf - 1.0);
    if is_eq(v, 0.0) {
        Some(0.0)
    } else if v < 0.0 {
        None
    } else {
        Some(v.sqrt())
    }
}

/// Pearson correlation from partial sums of f, o, f², o² and f·o.
///
/// Clamped to `[-1, 1]`. `None` when either variance term is not positive.
pub fn compute_corr(f: f64, o: f64, ff: f64, oo: f64, fo: f64, n: usize) -> Option<f64> {
    let nf = n as f64;
    let v = (nf * ff - f * f) * (nf * oo - o * o);
    if v <= 0.0 || is_eq(v, 0.0) {
        return None;
    }
    let c = (nf * fo - f * o) / v.sqrt();
    Some(c.clamp(-1.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn stdev_matches_direct() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let s: f64 = data.iter().sum();
        let ss: f64 = data.iter().map(|x| x * x).sum();
        let n = data.len() as f64;
        let mean = s / n;
        let direct = (data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt();
        assert_relative_eq!(
            compute_stdev(s, ss, data.len()).unwrap(),
            direct,
            epsilon = 1e-12
        );
    }

    #[test]
    fn stdev_constant_is_zero() {
        assert_eq!(compute_stdev(15.0, 75.0, 3), Some(0.0));
    }

    #[test]
    fn stdev_single_value_is_none() {
        assert!(compute_stdev(1.0, 1.0, 1).is_none());
    }

    #[test]
    fn corr_perfect_linear() {
        let f = [1.0, 2.0, 3.0, 4.0];
        let o = [2.0, 4.0, 6.0, 8.0];
        let sf: f64 = f.iter().sum();
        let so: f64 = o.iter().sum();
        let sff: f64 = f.iter().map(|x| x * x).sum();
        let soo: f64 = o.iter().map(|x| x * x).sum();
        let sfo: f64 = f.iter().zip(&o).map(|(a, b)| a * b).sum();
        assert_relative_eq!(compute_corr(sf, so, sff, soo, sfo, 4).unwrap(), 1.0);
    }

    #[test]
    fn corr_constant_is_none() {
        // f constant: n*ff - f^2 = 3*12 - 36 = 0
        assert!(compute_corr(6.0, 6.0, 12.0, 14.0, 12.0, 3).is_none());
    }
}
