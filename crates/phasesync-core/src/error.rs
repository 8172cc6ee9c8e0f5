use thiserror::Error;

/// Core error types for PhaseSync values
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("Invalid phase type: {0}")]
    InvalidPhaseType(String),

    #[error("Invalid deliverable status: {0}")]
    InvalidStatus(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Time formatting error: {0}")]
    TimeFormat(#[from] time::error::Format),
}

impl CoreError {
    /// Create a new InvalidDate error
    pub fn invalid_date(message: impl Into<String>) -> Self {
        Self::InvalidDate(message.into())
    }

    /// Create a new InvalidPhaseType error
    pub fn invalid_phase_type(value: impl Into<String>) -> Self {
        Self::InvalidPhaseType(value.into())
    }

    /// Create a new InvalidStatus error
    pub fn invalid_status(value: impl Into<String>) -> Self {
        Self::InvalidStatus(value.into())
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDate(_) | Self::InvalidPhaseType(_) | Self::InvalidStatus(_) => {
                ErrorCategory::Validation
            }
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::TimeFormat(_) => ErrorCategory::System,
        }
    }
}

/// Error categories for logging and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    System,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Serialization => write!(f, "serialization"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
