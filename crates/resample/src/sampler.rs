//! Index sampling primitives.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Draws index samples from the set `0..n_set`.
///
/// Implementations own one random stream; draws are sequential so a seeded
/// stream reproduces the same samples.
pub trait IndexSampler {
    /// `n` indices drawn uniformly with replacement.
    fn sample_with_replacement(&mut self, n_set: usize, n: usize) -> Vec<usize>;

    /// `min(n, n_set)` distinct indices drawn uniformly.
    fn sample_without_replacement(&mut self, n_set: usize, n: usize) -> Vec<usize>;
}

/// [`IndexSampler`] over any [`Rng`].
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    /// Wraps a generator.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns the generator.
    pub fn into_inner(self) -> R {
        self.rng
    }
}

impl RngSampler<StdRng> {
    /// Seeded [`StdRng`] sampler; `None` seeds from the operating system.
    pub fn from_seed(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng)
    }
}

impl<R: Rng> IndexSampler for RngSampler<R> {
    fn sample_with_replacement(&mut self, n_set: usize, n: usize) -> Vec<usize> {
        if n_set == 0 {
            return Vec::new();
        }
        (0..n).map(|_| self.rng.random_range(0..n_set)).collect()
    }

    fn sample_without_replacement(&mut self, n_set: usize, n: usize) -> Vec<usize> {
        rand::seq::index::sample(&mut self.rng, n_set, n.min(n_set)).into_vec()
    }
}
