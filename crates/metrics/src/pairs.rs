//! Matched forecast/observation pairs.

use crate::error::MetricsError;

/// Parallel arrays of matched forecast and observation values, with optional
/// per-pair climatology and weights.
///
/// Every stored value is finite. Weights default to 1.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PairData {
    f: Vec<f64>,
    o: Vec<f64>,
    climo_mean: Option<Vec<f64>>,
    climo_stdev: Option<Vec<f64>>,
    weight: Vec<f64>,
}

impl PairData {
    /// Builds pairs from forecast and observation values.
    ///
    /// # Errors
    ///
    /// Returns [`MetricsError`] on mismatched lengths or non-finite values.
    pub fn new(fcst: &[f64], obs: &[f64]) -> Result<Self, MetricsError> {
        check_len("obs", fcst.len(), obs.len())?;
        check_finite("fcst", fcst)?;
        check_finite("obs", obs)?;
        Ok(Self {
            f: fcst.to_vec(),
            o: obs.to_vec(),
            climo_mean: None,
            climo_stdev: None,
            weight: vec![1.0; fcst.len()],
        })
    }

    /// Attaches climatological mean and standard deviation per pair.
    pub fn with_climo(mut self, mean: &[f64], stdev: &[f64]) -> Result<Self, MetricsError> {
        check_len("climo_mean", self.len(), mean.len())?;
        check_len("climo_stdev", self.len(), stdev.len())?;
        check_finite("climo_mean", mean)?;
        check_finite("climo_stdev", stdev)?;
        self.climo_mean = Some(mean.to_vec());
        self.climo_stdev = Some(stdev.to_vec());
        Ok(self)
    }

    /// Attaches climatological means only.
    pub fn with_climo_mean(mut self, mean: &[f64]) -> Result<Self, MetricsError> {
        check_len("climo_mean", self.len(), mean.len())?;
        check_finite("climo_mean", mean)?;
        self.climo_mean = Some(mean.to_vec());
        Ok(self)
    }

    /// Replaces the default unit weights. Weights must be finite and
    /// non-negative.
    pub fn with_weights(mut self, weight: &[f64]) -> Result<Self, MetricsError> {
        check_len("weight", self.len(), weight.len())?;
        if let Some(index) = weight.iter().position(|w| !w.is_finite() || *w < 0.0) {
            return Err(MetricsError::NonFiniteInput {
                field: "weight",
                index,
            });
        }
        self.weight = weight.to_vec();
        Ok(self)
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.f.len()
    }

    /// True when there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.f.is_empty()
    }

    /// Forecast values.
    pub fn fcst(&self) -> &[f64] {
        &self.f
    }

    /// Observation values.
    pub fn obs(&self) -> &[f64] {
        &self.o
    }

    /// Pair weights.
    pub fn weights(&self) -> &[f64] {
        &self.weight
    }

    /// True when climatological means are attached.
    pub fn has_climo(&self) -> bool {
        self.climo_mean.is_some()
    }

    /// Climatological mean of pair `i`, if attached.
    pub fn climo_mean(&self, i: usize) -> Option<f64> {
        self.climo_mean.as_ref().and_then(|c| c.get(i).copied())
    }

    /// Climatological standard deviation of pair `i`, if attached.
    pub fn climo_stdev(&self, i: usize) -> Option<f64> {
        self.climo_stdev.as_ref().and_then(|c| c.get(i).copied())
    }

    /// Indices of every pair, in order.
    pub fn all_indices(&self) -> Vec<usize> {
        (0..self.len()).collect()
    }

    /// Copies the pairs at `indices` (repeats allowed) into a new set.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, MetricsError> {
        self.check_indices(indices)?;
        let pick = |v: &[f64]| indices.iter().map(|&i| v[i]).collect::<Vec<_>>();
        Ok(Self {
            f: pick(&self.f),
            o: pick(&self.o),
            climo_mean: self.climo_mean.as_deref().map(pick),
            climo_stdev: self.climo_stdev.as_deref().map(pick),
            weight: pick(&self.weight),
        })
    }

    /// Fails when any index is outside the pair arrays.
    pub fn check_indices(&self, indices: &[usize]) -> Result<(), MetricsError> {
        check_indices(indices, self.len())
    }

    /// Weights of the pairs at `indices`, normalized to sum to one.
    ///
    /// All-zero weights fall back to equal weighting.
    pub(crate) fn normalized_weights(&self, indices: &[usize]) -> Vec<f64> {
        let total: f64 = indices.iter().map(|&i| self.weight[i]).sum();
        if total > 0.0 {
            indices.iter().map(|&i| self.weight[i] / total).collect()
        } else {
            vec![1.0 / indices.len().max(1) as f64; indices.len()]
        }
    }
}

pub(crate) fn check_len(field: &'static str, expected: usize, got: usize) -> Result<(), MetricsError> {
    if expected != got {
        return Err(MetricsError::LengthMismatch {
            field,
            expected,
            got,
        });
    }
    Ok(())
}

pub(crate) fn check_finite(field: &'static str, values: &[f64]) -> Result<(), MetricsError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(MetricsError::NonFiniteInput { field, index }),
        None => Ok(()),
    }
}

pub(crate) fn check_indices(indices: &[usize], len: usize) -> Result<(), MetricsError> {
    match indices.iter().find(|&&i| i >= len) {
        Some(&index) => Err(MetricsError::IndexOutOfRange { index, len }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        assert!(matches!(
            PairData::new(&[1.0, 2.0], &[1.0]),
            Err(MetricsError::LengthMismatch { field: "obs", expected: 2, got: 1 })
        ));
        let pd = PairData::new(&[1.0, 2.0], &[1.0, 2.0]).unwrap();
        assert!(pd.clone().with_climo(&[0.0], &[1.0, 1.0]).is_err());
        assert!(pd.with_weights(&[1.0]).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(matches!(
            PairData::new(&[1.0, f64::NAN], &[1.0, 2.0]),
            Err(MetricsError::NonFiniteInput { field: "fcst", index: 1 })
        ));
        let pd = PairData::new(&[1.0], &[1.0]).unwrap();
        assert!(pd.with_weights(&[-1.0]).is_err());
    }

    #[test]
    fn subset_repeats_and_carries_climo() {
        let pd = PairData::new(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0])
            .unwrap()
            .with_climo(&[0.1, 0.2, 0.3], &[1.0, 1.0, 1.0])
            .unwrap();
        let sub = pd.subset(&[2, 2, 0]).unwrap();
        assert_eq!(sub.fcst(), &[3.0, 3.0, 1.0]);
        assert_eq!(sub.obs(), &[6.0, 6.0, 4.0]);
        assert_eq!(sub.climo_mean(2), Some(0.1));
        assert!(pd.subset(&[3]).is_err());
    }

    #[test]
    fn normalized_weights_sum_to_one() {
        let pd = PairData::new(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0])
            .unwrap()
            .with_weights(&[1.0, 2.0, 1.0])
            .unwrap();
        let w = pd.normalized_weights(&[0, 1, 1]);
        assert_eq!(w, vec![0.2, 0.4, 0.4]);
        let zero = PairData::new(&[1.0, 2.0], &[1.0, 2.0])
            .unwrap()
            .with_weights(&[0.0, 0.0])
            .unwrap();
        assert_eq!(zero.normalized_weights(&[0, 1]), vec![0.5, 0.5]);
    }

    #[test]
    fn missing_climo_is_none() {
        let pd = PairData::new(&[1.0], &[1.0]).unwrap();
        assert!(!pd.has_climo());
        assert_eq!(pd.climo_mean(0), None);
        assert_eq!(pd.climo_stdev(0), None);
    }
}
