//! Error types for the verif-thresh crate.

use crate::op::ThreshOp;

/// Error type for all fallible operations in the verif-thresh crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ThreshError {
    /// Returned when a threshold string cannot be parsed.
    #[error("cannot parse threshold \"{input}\": {reason}")]
    Parse {
        /// The offending input.
        input: String,
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a climatological percentile is outside 0..=100.
    #[error("climatological percentile must be in 0..=100, got {p}")]
    InvalidPercentile {
        /// The invalid percentile.
        p: f64,
    },

    /// Returned when a threshold array has no entries.
    #[error("threshold array is empty")]
    EmptyArray,

    /// Returned when a threshold array mixes comparison operators.
    #[error("threshold array mixes operators {first} and {other}")]
    MixedOps {
        /// Operator of the first threshold.
        first: ThreshOp,
        /// First differing operator.
        other: ThreshOp,
    },

    /// Returned when a threshold array uses an operator that cannot define bins.
    #[error("operator {op} cannot define categories (use <, <=, > or >=)")]
    InvalidBinOp {
        /// The rejected operator.
        op: ThreshOp,
    },

    /// Returned when threshold values are not strictly increasing.
    #[error("threshold values must be strictly increasing at index {index}")]
    NotIncreasing {
        /// Index of the first out-of-order value.
        index: usize,
    },
}
