//! Grading errors

/// Errors raised by the grading core.
///
/// Empty inputs are not errors: every analysis returns a well-defined empty
/// result instead.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GradingError {
    /// Catalog or threshold wiring is broken. Not recoverable at runtime.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A fault id that the catalog does not know.
    #[error("Unknown fault type: {code}")]
    UnknownFaultType { code: String },

    /// A repetition is already being graded on this worker.
    #[error("A grading task is already in flight")]
    TaskInFlight,

    /// `submit` was called outside a tokio runtime.
    #[error("No tokio runtime available for background grading")]
    RuntimeUnavailable,

    /// Grading failed inside the background task.
    #[error("Background grading failed: {message}")]
    BackgroundTask { message: String },
}

impl GradingError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Stable code string (for logging)
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::UnknownFaultType { .. } => "CONFIGURATION_UNKNOWN_FAULT_TYPE",
            Self::TaskInFlight => "WORKER_TASK_IN_FLIGHT",
            Self::RuntimeUnavailable => "WORKER_RUNTIME_UNAVAILABLE",
            Self::BackgroundTask { .. } => "WORKER_BACKGROUND_TASK_FAILURE",
        }
    }

    /// Wiring bugs, as opposed to runtime conditions
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. } | Self::UnknownFaultType { .. })
    }
}

pub type Result<T> = std::result::Result<T, GradingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_fault_is_fatal() {
        let err = GradingError::UnknownFaultType { code: "WOBBLE".into() };
        assert!(err.is_fatal());
        assert_eq!(err.error_code(), "CONFIGURATION_UNKNOWN_FAULT_TYPE");
        assert_eq!(err.to_string(), "Unknown fault type: WOBBLE");
    }

    #[test]
    fn test_worker_errors_are_not_fatal() {
        assert!(!GradingError::TaskInFlight.is_fatal());
        assert!(!GradingError::RuntimeUnavailable.is_fatal());
        let err = GradingError::BackgroundTask { message: "boom".into() };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("boom"));
    }
}
