//! Mean and standard deviation of a single series of values.

use serde::Serialize;
use verif_stats::compute_stdev;

use crate::ci_info::{CiInfo, check_alpha};
use crate::cnt::{mean_ci, mean_critical_values, stdev_ci};
use crate::error::MetricsError;
use crate::family::{StatFamily, ci_fields};
use crate::pairs::{check_finite, check_indices};

/// Sample mean with a Student-t (below 30 values) or normal interval, and
/// sample standard deviation with a Chi-squared interval.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeanStdev {
    alpha: Vec<f64>,
    n: u64,
    /// Sample mean.
    pub mean: CiInfo,
    /// Sample standard deviation.
    pub stdev: CiInfo,
}

impl MeanStdev {
    /// Creates an empty family.
    pub fn new(alpha: &[f64]) -> Result<Self, MetricsError> {
        let alpha = check_alpha(alpha)?;
        let ci = CiInfo::new(alpha.len());
        Ok(Self {
            alpha,
            n: 0,
            mean: ci.clone(),
            stdev: ci,
        })
    }

    /// Computes the point statistics over `values[indices]`.
    pub fn set_values(&mut self, values: &[f64], indices: &[usize]) -> Result<(), MetricsError> {
        check_indices(indices, values.len())?;
        check_finite("values", values)?;
        let n = indices.len();
        let (sum, sum_sq) = indices
            .iter()
            .map(|&i| values[i])
            .fold((0.0, 0.0), |(s, ss), v| (s + v, ss + v * v));
        self.n = n as u64;
        self.mean.v = (n > 0).then(|| sum / n as f64);
        self.stdev.v = compute_stdev(sum, sum_sq, n);
        self.mean.n = self.n;
        self.stdev.n = self.n;
        Ok(())
    }

    /// Fills the normal-approximation bounds for every alpha level.
    pub fn compute_ci(&mut self) {
        let n = self.n as usize;
        for (i, &a) in self.alpha.iter().enumerate() {
            let cv = mean_critical_values(a, n);
            let mean = mean_ci(&self.mean, self.stdev.v, cv, n);
            self.mean.set_normal(i, mean);
            let stdev = stdev_ci(&self.stdev, a, n);
            self.stdev.set_normal(i, stdev);
        }
    }
}

impl StatFamily for MeanStdev {
    type Pairs = [f64];

    const NAME: &'static str = "MEAN_STDEV";

    fn n_pairs(pairs: &[f64]) -> usize {
        pairs.len()
    }

    fn alpha(&self) -> &[f64] {
        &self.alpha
    }

    fn total(&self) -> u64 {
        self.n
    }

    ci_fields! {
        "MEAN" => mean,
        "STDEV" => stdev,
    }

    fn replicate(&self, pairs: &[f64], indices: &[usize]) -> Result<Self, MetricsError> {
        let mut out = Self::new(&self.alpha)?;
        out.set_values(pairs, indices)?;
        Ok(out)
    }
}
