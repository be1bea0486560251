//! Error types for the verif-resample crate.

/// Error type for all fallible operations in the verif-resample crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ResampleError {
    /// Returned when configuration is invalid.
    #[error("invalid configuration: {reason}")]
    InvalidConfig {
        /// Description of the problem.
        reason: String,
    },

    /// Statistic family error.
    #[error(transparent)]
    Metrics(#[from] verif_metrics::MetricsError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_invalid_config() {
        let e = ResampleError::InvalidConfig {
            reason: "bad".to_string(),
        };
        assert_eq!(e.to_string(), "invalid configuration: bad");
    }

    #[test]
    fn from_metrics_error() {
        let me = verif_metrics::MetricsError::NoAlpha;
        let re: ResampleError = me.into();
        assert!(matches!(re, ResampleError::Metrics(_)));
        assert_eq!(re.to_string(), "at least one alpha level is required");
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ResampleError>();
    }
}
