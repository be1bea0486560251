//! Ordered threshold arrays that partition values into categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ThreshError;
use crate::op::ThreshOp;
use crate::single::{SingleThresh, ThreshValue};

/// N thresholds sharing one bounding operator, defining N+1 categories.
///
/// Fixed-value thresholds must be strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ThreshArray {
    threshes: Vec<SingleThresh>,
}

impl ThreshArray {
    /// Builds and validates an array.
    pub fn new(threshes: Vec<SingleThresh>) -> Result<Self, ThreshError> {
        let first = threshes.first().ok_or(ThreshError::EmptyArray)?.op();
        if !(first.is_upper_bound() || first.is_lower_bound()) {
            return Err(ThreshError::InvalidBinOp { op: first });
        }
        if let Some(other) = threshes.iter().map(|t| t.op()).find(|&op| op != first) {
            return Err(ThreshError::MixedOps { first, other });
        }
        let fixed: Vec<(usize, f64)> = threshes
            .iter()
            .enumerate()
            .filter_map(|(i, t)| match t.value() {
                ThreshValue::Fixed(v) => Some((i, v)),
                ThreshValue::ClimoPercentile(_) => None,
            })
            .collect();
        for w in fixed.windows(2) {
            if w[1].1 <= w[0].1 {
                return Err(ThreshError::NotIncreasing { index: w[1].0 });
            }
        }
        Ok(Self { threshes })
    }

    /// Number of thresholds.
    pub fn len(&self) -> usize {
        self.threshes.len()
    }

    /// Always false for a validated array.
    pub fn is_empty(&self) -> bool {
        self.threshes.is_empty()
    }

    /// Number of categories (`len() + 1`).
    pub fn n_categories(&self) -> usize {
        self.threshes.len() + 1
    }

    /// Returns the thresholds.
    pub fn threshes(&self) -> &[SingleThresh] {
        &self.threshes
    }

    /// Maps a value to its category in `0..=len()`.
    ///
    /// For `<`/`<=` arrays the category is the index of the first passing
    /// threshold, or `len()` if none pass. For `>`/`>=` arrays the scan runs
    /// from the top and returns `i + 1` for the first passing threshold, or
    /// 0 if none pass.
    pub fn check_bins(&self, value: f64, climo_mean: Option<f64>, climo_stdev: Option<f64>) -> usize {
        let n = self.threshes.len();
        let passes = |t: &SingleThresh| t.check(value, climo_mean, climo_stdev);
        if self.threshes[0].op().is_upper_bound() {
            self.threshes.iter().position(passes).unwrap_or(n)
        } else {
            self.threshes
                .iter()
                .rposition(passes)
                .map_or(0, |i| i + 1)
        }
    }
}

impl fmt::Display for ThreshArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.threshes.iter().map(|t| t.to_string()).collect();
        f.write_str(&parts.join(","))
    }
}

impl FromStr for ThreshArray {
    type Err = ThreshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let threshes = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<SingleThresh>, _>>()?;
        Self::new(threshes)
    }
}

impl TryFrom<String> for ThreshArray {
    type Error = ThreshError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ThreshArray> for String {
    fn from(t: ThreshArray) -> Self {
        t.to_string()
    }
}
