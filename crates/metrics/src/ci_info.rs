//! A statistic value with its confidence bounds at each alpha level.

use serde::Serialize;
use verif_contable::Interval;

use crate::error::MetricsError;

/// One statistic plus normal-approximation (`v_ncl`/`v_ncu`) and bootstrap
/// (`v_bcl`/`v_bcu`) bounds, one slot per alpha level.
///
/// Missing values and bounds are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CiInfo {
    /// Statistic value.
    pub v: Option<f64>,
    /// Sample count behind the value.
    pub n: u64,
    /// Variance inflation factor for serially correlated samples.
    pub vif: f64,
    /// Normal-approximation lower bounds.
    pub v_ncl: Vec<Option<f64>>,
    /// Normal-approximation upper bounds.
    pub v_ncu: Vec<Option<f64>>,
    /// Bootstrap lower bounds.
    pub v_bcl: Vec<Option<f64>>,
    /// Bootstrap upper bounds.
    pub v_bcu: Vec<Option<f64>>,
}

impl CiInfo {
    /// Creates a missing value with `n_alpha` empty bound slots.
    pub fn new(n_alpha: usize) -> Self {
        Self {
            v: None,
            n: 0,
            vif: 1.0,
            v_ncl: vec![None; n_alpha],
            v_ncu: vec![None; n_alpha],
            v_bcl: vec![None; n_alpha],
            v_bcu: vec![None; n_alpha],
        }
    }

    /// Number of alpha slots.
    pub fn n_alpha(&self) -> usize {
        self.v_ncl.len()
    }

    /// Replaces every bound slot with `n_alpha` missing values.
    pub fn allocate_n_alpha(&mut self, n_alpha: usize) {
        for bounds in [
            &mut self.v_ncl,
            &mut self.v_ncu,
            &mut self.v_bcl,
            &mut self.v_bcu,
        ] {
            bounds.clear();
            bounds.resize(n_alpha, None);
        }
    }

    /// Marks the value and every bound missing, keeping the slot count.
    pub fn set_bad_data(&mut self) {
        self.v = None;
        self.allocate_n_alpha(self.n_alpha());
    }

    /// Stores a normal-approximation interval at alpha slot `i`.
    pub fn set_normal(&mut self, i: usize, ci: Option<Interval>) {
        self.v_ncl[i] = ci.map(|c| c.lower);
        self.v_ncu[i] = ci.map(|c| c.upper);
    }

    /// Stores a bootstrap interval at alpha slot `i`.
    pub fn set_bootstrap(&mut self, i: usize, ci: Option<Interval>) {
        self.v_bcl[i] = ci.map(|c| c.lower);
        self.v_bcu[i] = ci.map(|c| c.upper);
    }

    /// Normal-approximation interval at slot `i`, when both bounds exist.
    pub fn normal(&self, i: usize) -> Option<Interval> {
        let lower = self.v_ncl.get(i).copied().flatten()?;
        let upper = self.v_ncu.get(i).copied().flatten()?;
        Some(Interval::new(lower, upper))
    }

    /// Bootstrap interval at slot `i`, when both bounds exist.
    pub fn bootstrap(&self, i: usize) -> Option<Interval> {
        let lower = self.v_bcl.get(i).copied().flatten()?;
        let upper = self.v_bcu.get(i).copied().flatten()?;
        Some(Interval::new(lower, upper))
    }
}

impl Default for CiInfo {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Checks that every alpha level lies in (0, 1).
pub(crate) fn check_alpha(alpha: &[f64]) -> Result<Vec<f64>, MetricsError> {
    if alpha.is_empty() {
        return Err(MetricsError::NoAlpha);
    }
    if let Some(&a) = alpha.iter().find(|&&a| !(a > 0.0 && a < 1.0)) {
        return Err(MetricsError::InvalidAlpha { alpha: a });
    }
    Ok(alpha.to_vec())
}
