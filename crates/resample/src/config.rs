//! Configuration for bootstrap confidence intervals.

use crate::error::ResampleError;

/// Interval method applied to the bootstrap replicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Method {
    /// Bias-corrected and accelerated percentiles (needs a jackknife pass).
    #[default]
    Bca,
    /// Plain percentiles of the replicate distribution.
    Percentile,
}

/// Configuration for the resampling engine.
///
/// # Example
///
/// ```
/// use verif_resample::{Method, ResampleConfig};
///
/// let config = ResampleConfig::new()
///     .with_method(Method::Percentile)
///     .with_n_rep(500)
///     .with_seed(Some(42));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ResampleConfig {
    method: Method,
    n_rep: usize,
    m_prop: f64,
    replace: bool,
    seed: Option<u64>,
}

impl ResampleConfig {
    /// Creates a new configuration with defaults.
    ///
    /// Defaults: `method = Bca`, `n_rep = 1000`, `m_prop = 1.0`,
    /// `replace = true`, `seed = None`.
    pub fn new() -> Self {
        Self {
            method: Method::Bca,
            n_rep: 1000,
            m_prop: 1.0,
            replace: true,
            seed: None,
        }
    }

    /// Sets the interval method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets the number of bootstrap replicates. Zero disables resampling.
    pub fn with_n_rep(mut self, n: usize) -> Self {
        self.n_rep = n;
        self
    }

    /// Sets the replicate size as a proportion of the sample size
    /// (percentile method only).
    pub fn with_m_prop(mut self, p: f64) -> Self {
        self.m_prop = p;
        self
    }

    /// Draws percentile-method replicates without replacement when false.
    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    /// Sets the RNG seed. `None` seeds from the operating system.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    // --- Accessors ---

    /// Returns the interval method.
    pub fn method(&self) -> Method {
        self.method
    }

    /// Returns the number of bootstrap replicates.
    pub fn n_rep(&self) -> usize {
        self.n_rep
    }

    /// Returns the replicate size proportion.
    pub fn m_prop(&self) -> f64 {
        self.m_prop
    }

    /// Returns whether replicates are drawn with replacement.
    pub fn replace(&self) -> bool {
        self.replace
    }

    /// Returns the RNG seed.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Replicate size for a sample of `n` pairs.
    ///
    /// BCa always resamples `n`; the percentile method resamples
    /// `round(m_prop·n)`, at least 1.
    pub fn replicate_size(&self, n: usize) -> usize {
        match self.method {
            Method::Bca => n,
            Method::Percentile => ((self.m_prop * n as f64).round() as usize).max(1),
        }
    }

    /// Validates this configuration.
    ///
    /// `m_prop` must lie in (0, 1]; subsampling without replacement needs
    /// `m_prop < 1`, and BCa always samples with replacement.
    pub fn validate(&self) -> Result<(), ResampleError> {
        if !self.m_prop.is_finite() || self.m_prop <= 0.0 || self.m_prop > 1.0 {
            return Err(ResampleError::InvalidConfig {
                reason: format!("m_prop must be in (0, 1], got {}", self.m_prop),
            });
        }
        if !self.replace {
            if self.method == Method::Bca {
                return Err(ResampleError::InvalidConfig {
                    reason: "BCa intervals require sampling with replacement".to_string(),
                });
            }
            if self.m_prop >= 1.0 {
                return Err(ResampleError::InvalidConfig {
                    reason: "sampling without replacement requires m_prop < 1".to_string(),
                });
            }
        }
        Ok(())
    }
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self::new()
    }
}
