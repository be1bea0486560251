//! A single event threshold.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use verif_stats::normal_quantile;

use crate::error::ThreshError;
use crate::op::ThreshOp;

const CDP_PREFIX: &str = "CDP";

/// What a threshold compares against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThreshValue {
    /// A fixed value.
    Fixed(f64),
    /// A percentile (0..=100) of a normal climatological distribution
    /// described by the per-point climatology mean and standard deviation.
    ClimoPercentile(f64),
}

/// One comparison, e.g. `>=5.0` or `>CDP90`.
///
/// Parses from and serializes to its string form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SingleThresh {
    op: ThreshOp,
    value: ThreshValue,
}

impl SingleThresh {
    /// Threshold against a fixed value.
    pub fn new(op: ThreshOp, value: f64) -> Self {
        Self {
            op,
            value: ThreshValue::Fixed(value),
        }
    }

    /// Threshold against the `p`-th percentile of the climatological
    /// distribution at each point.
    pub fn climo_percentile(op: ThreshOp, p: f64) -> Result<Self, ThreshError> {
        if !(0.0..=100.0).contains(&p) {
            return Err(ThreshError::InvalidPercentile { p });
        }
        Ok(Self {
            op,
            value: ThreshValue::ClimoPercentile(p),
        })
    }

    /// Threshold that always passes.
    pub fn na() -> Self {
        Self {
            op: ThreshOp::Na,
            value: ThreshValue::Fixed(0.0),
        }
    }

    /// Returns the comparison operator.
    pub fn op(&self) -> ThreshOp {
        self.op
    }

    /// Returns the threshold value definition.
    pub fn value(&self) -> ThreshValue {
        self.value
    }

    /// Returns true for thresholds that need climatology to evaluate.
    pub fn needs_climo(&self) -> bool {
        self.op != ThreshOp::Na && matches!(self.value, ThreshValue::ClimoPercentile(_))
    }

    /// Resolves the threshold value at a point.
    ///
    /// `None` for a climatological percentile without a usable mean and
    /// standard deviation.
    pub fn resolve(&self, climo_mean: Option<f64>, climo_stdev: Option<f64>) -> Option<f64> {
        match self.value {
            ThreshValue::Fixed(v) => Some(v),
            ThreshValue::ClimoPercentile(p) => {
                let (cmn, csd) = (climo_mean?, climo_stdev?);
                if !cmn.is_finite() || !csd.is_finite() {
                    return None;
                }
                Some(cmn + csd * normal_quantile(p / 100.0)?)
            }
        }
    }

    /// Checks `value <op> threshold`, resolving climatological thresholds
    /// from the supplied climatology. Fails closed when the threshold
    /// cannot be resolved.
    pub fn check(&self, value: f64, climo_mean: Option<f64>, climo_stdev: Option<f64>) -> bool {
        if self.op == ThreshOp::Na {
            return true;
        }
        match self.resolve(climo_mean, climo_stdev) {
            Some(t) => self.op.apply(value, t),
            None => false,
        }
    }
}

impl Default for SingleThresh {
    fn default() -> Self {
        Self::na()
    }
}

impl fmt::Display for SingleThresh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.op == ThreshOp::Na {
            return f.write_str("NA");
        }
        match self.value {
            ThreshValue::Fixed(v) => write!(f, "{}{}", self.op, v),
            ThreshValue::ClimoPercentile(p) => write!(f, "{}{CDP_PREFIX}{}", self.op, p),
        }
    }
}

impl FromStr for SingleThresh {
    type Err = ThreshError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("na") {
            return Ok(Self::na());
        }
        let parse_err = |reason: &str| ThreshError::Parse {
            input: s.to_string(),
            reason: reason.to_string(),
        };
        let (op, rest) =
            ThreshOp::split_prefix(trimmed).ok_or_else(|| parse_err("missing operator"))?;
        let rest = rest.trim();
        let upper = rest.to_ascii_uppercase();
        if let Some(p) = upper.strip_prefix(CDP_PREFIX) {
            let p: f64 = p
                .trim()
                .parse()
                .map_err(|_| parse_err("invalid percentile"))?;
            return Self::climo_percentile(op, p);
        }
        let v: f64 = rest.parse().map_err(|_| parse_err("invalid value"))?;
        if !v.is_finite() {
            return Err(parse_err("value must be finite"));
        }
        Ok(Self::new(op, v))
    }
}

impl TryFrom<String> for SingleThresh {
    type Error = ThreshError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<SingleThresh> for String {
    fn from(t: SingleThresh) -> Self {
        t.to_string()
    }
}
