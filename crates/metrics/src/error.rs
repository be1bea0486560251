//! Error types for the verif-metrics crate.

/// Error type for all fallible operations in the verif-metrics crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    /// Returned when parallel pair arrays differ in length.
    #[error("{field}: expected {expected} elements, got {got}")]
    LengthMismatch {
        /// Name of the mismatched field.
        field: &'static str,
        /// Expected length.
        expected: usize,
        /// Actual length.
        got: usize,
    },

    /// Returned when pair data contains NaN or infinity.
    #[error("non-finite value in {field} at index {index}")]
    NonFiniteInput {
        /// Name of the field containing the value.
        field: &'static str,
        /// Position of the value.
        index: usize,
    },

    /// Returned when a pair index is outside the pair arrays.
    #[error("pair index {index} out of range for {len} pairs")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of pairs.
        len: usize,
    },

    /// Returned when an alpha level is outside (0, 1).
    #[error("alpha must be in (0, 1), got {alpha}")]
    InvalidAlpha {
        /// The rejected alpha.
        alpha: f64,
    },

    /// Returned when no alpha levels are given.
    #[error("at least one alpha level is required")]
    NoAlpha,

    /// Returned when `get_stat` is asked for a name the family does not know.
    #[error("unknown {family} statistic \"{name}\"")]
    UnknownStat {
        /// Family name.
        family: &'static str,
        /// Requested statistic name.
        name: String,
    },

    /// Returned when forecast and observation category thresholds differ in count.
    #[error("forecast has {fcst} category thresholds but observation has {obs}")]
    ThresholdCount {
        /// Forecast threshold count.
        fcst: usize,
        /// Observation threshold count.
        obs: usize,
    },

    /// Returned when probability bin thresholds are not plain values.
    #[error("probability thresholds must be fixed values: {reason}")]
    InvalidProbThresh {
        /// Description of the problem.
        reason: String,
    },

    /// Returned when a neighborhood width is even or zero.
    #[error("neighborhood width must be a positive odd number, got {width}")]
    InvalidWidth {
        /// The rejected width.
        width: usize,
    },

    /// Returned when a grid's dimensions do not match its data.
    #[error("a {nx}x{ny} grid needs {} values, got {len}", .nx * .ny)]
    GridShape {
        /// Columns.
        nx: usize,
        /// Rows.
        ny: usize,
        /// Values supplied.
        len: usize,
    },

    /// Contingency table error.
    #[error(transparent)]
    Contable(#[from] verif_contable::ContableError),

    /// Threshold error.
    #[error(transparent)]
    Thresh(#[from] verif_thresh::ThreshError),
}
