//! Error types for Payhuk operations

use std::time::Duration;
use thiserror::Error;

/// Query layer errors.
///
/// Every failure surfaced by the query facade is one of these. The retry
/// executor treats all variants the same way.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("Query timed out after {limit:?}")]
    Timeout { limit: Duration },

    #[error("Invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("Upstream error (status {status:?}): {message}")]
    Upstream { status: Option<u16>, message: String },

    #[error("Unauthenticated: {reason}")]
    Unauthenticated { reason: String },

    #[error("Decode error: {reason}")]
    Decode { reason: String },
}

impl QueryError {
    /// Create an InvalidArgument error.
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an Upstream error without a status code.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            status: None,
            message: message.into(),
        }
    }

    /// Create an Upstream error carrying the backend's status code.
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status: Some(status),
            message: message.into(),
        }
    }

    /// Create an Unauthenticated error.
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self::Unauthenticated {
            reason: reason.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode {
            reason: err.to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all Payhuk errors.
#[derive(Debug, Clone, Error)]
pub enum PayhukError {
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

/// Result type alias for Payhuk operations.
pub type PayhukResult<T> = Result<T, PayhukError>;

/// Result type alias for query layer operations.
pub type QueryResult<T> = Result<T, QueryError>;

// =============================================================================
// TESTS
// =============================================================================
