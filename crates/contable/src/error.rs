//! Error types for the verif-contable crate.

/// Error type for all fallible operations in the verif-contable crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ContableError {
    /// Returned when a table would have fewer than 2 rows or columns.
    #[error("table must be at least 2x2, got {rows}x{cols}")]
    InvalidSize {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// Returned when resizing a fixed-size table.
    #[error("a {rows}x{cols} table cannot be resized")]
    FixedSize {
        /// Fixed row count.
        rows: usize,
        /// Fixed column count.
        cols: usize,
    },

    /// Returned when a row or column index is outside the table.
    #[error("entry ({row}, {col}) is outside a {rows}x{cols} table")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
        /// Table rows.
        rows: usize,
        /// Table columns.
        cols: usize,
    },

    /// Returned when a square-table operation is applied to a rectangular table.
    #[error("{op} requires a square table, got {rows}x{cols}")]
    NotSquare {
        /// Operation name.
        op: &'static str,
        /// Table rows.
        rows: usize,
        /// Table columns.
        cols: usize,
    },

    /// Returned when merging tables of different shapes.
    #[error("cannot merge a {other_rows}x{other_cols} table into a {rows}x{cols} table")]
    SizeMismatch {
        /// Target rows.
        rows: usize,
        /// Target columns.
        cols: usize,
        /// Source rows.
        other_rows: usize,
        /// Source columns.
        other_cols: usize,
    },

    /// Returned when a probability value falls outside the bin thresholds.
    #[error("value {value} is outside the threshold range [{lo}, {hi}]")]
    ValueOutOfRange {
        /// The rejected value.
        value: f64,
        /// Lowest threshold.
        lo: f64,
        /// Highest threshold.
        hi: f64,
    },

    /// Returned when probability bin thresholds are malformed.
    #[error("invalid bin thresholds: {reason}")]
    InvalidThresholds {
        /// Description of the problem.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_size() {
        let e = ContableError::InvalidSize { rows: 1, cols: 3 };
        assert_eq!(e.to_string(), "table must be at least 2x2, got 1x3");
    }

    #[test]
    fn display_fixed_size() {
        let e = ContableError::FixedSize { rows: 2, cols: 2 };
        assert_eq!(e.to_string(), "a 2x2 table cannot be resized");
    }

    #[test]
    fn display_not_square() {
        let e = ContableError::NotSquare {
            op: "gerrity",
            rows: 3,
            cols: 2,
        };
        assert_eq!(e.to_string(), "gerrity requires a square table, got 3x2");
    }

    #[test]
    fn display_value_out_of_range() {
        let e = ContableError::ValueOutOfRange {
            value: 1.5,
            lo: 0.0,
            hi: 1.0,
        };
        assert_eq!(e.to_string(), "value 1.5 is outside the threshold range [0, 1]");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ContableError>();
    }
}
