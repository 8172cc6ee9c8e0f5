//! Error types for calls against the remote tracker.

use std::fmt;

/// Errors that can occur while talking to the tracker backend.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    /// The addressed record does not exist (or is soft-deleted).
    #[error("Not found: {resource}/{id}")]
    NotFound {
        /// The kind of record, e.g. `deliverable`.
        resource: String,
        /// The id that was requested.
        id: String,
    },

    /// The backend answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The server's message, or the raw body.
        message: String,
    },

    /// The request never produced a response.
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decode error: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
    },

    /// The request could not be built.
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Description of what is wrong with the request.
        message: String,
    },
}

impl ApiError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Decode` error.
    #[must_use]
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidRequest` error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Returns `true` for a missing record, including a bare 404 status.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Status { status: 404, .. }
        )
    }

    /// Returns the error category for logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Status { status: 404, .. } => ErrorCategory::NotFound,
            Self::Status { .. } => ErrorCategory::Remote,
            Self::Transport { .. } => ErrorCategory::Transport,
            Self::Decode { .. } => ErrorCategory::Serialization,
            Self::InvalidRequest { .. } => ErrorCategory::Validation,
        }
    }
}

/// Categories of API errors for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Record not found.
    NotFound,
    /// Non-success answer from the backend.
    Remote,
    /// Connection or timeout failure.
    Transport,
    /// Body could not be decoded.
    Serialization,
    /// Request was malformed before sending.
    Validation,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Remote => write!(f, "remote"),
            Self::Transport => write!(f, "transport"),
            Self::Serialization => write!(f, "serialization"),
            Self::Validation => write!(f, "validation"),
        }
    }
}
