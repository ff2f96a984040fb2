//! Error Types for the Payhuk edge service
//!
//! Every handler returns [`ApiResult`]. Errors are serialized as JSON
//! `{code, message, details?}` with the status code implied by [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use payhuk_core::{ConfigError, QueryError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// No session was presented
    Unauthenticated,

    /// Session token is malformed or its signature does not verify
    InvalidToken,

    /// Session token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request body could not be understood
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Relay action is not one of the supported actions
    UnknownAction,

    // ========================================================================
    // Upstream Errors (502, 504)
    // ========================================================================
    /// The gateway or backend failed
    UpstreamError,

    /// The gateway or backend did not answer in time
    Timeout,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// A secret or URL the endpoint needs has not been configured
    MissingConfiguration,

    /// Internal server error
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthenticated | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::InvalidInput | ErrorCode::MissingField | ErrorCode::UnknownAction => {
                StatusCode::BAD_REQUEST
            }

            ErrorCode::UpstreamError => StatusCode::BAD_GATEWAY,
            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::MissingConfiguration | ErrorCode::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::Unauthenticated => "Authentication required",
            ErrorCode::InvalidToken => "Invalid authentication token",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::UnknownAction => "Unknown action",
            ErrorCode::UpstreamError => "Upstream service failed",
            ErrorCode::Timeout => "Upstream service timed out",
            ErrorCode::MissingConfiguration => "Service is not configured",
            ErrorCode::InternalError => "Internal server error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Create a new API error with the given code, using the default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self::new(code, code.default_message())
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthenticated, message)
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    pub fn token_expired() -> Self {
        Self::from_code(ErrorCode::TokenExpired)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    pub fn unknown_action(action: &str) -> Self {
        Self::new(ErrorCode::UnknownAction, format!("Unknown action: {}", action))
    }

    /// The endpoint cannot run until `setting` is provided.
    pub fn missing_configuration(setting: &str) -> Self {
        Self::new(
            ErrorCode::MissingConfiguration,
            format!("{} is not configured", setting),
        )
        .with_details(serde_json::json!({ "setting": setting }))
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UpstreamError, message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Timeout { limit } => {
                tracing::warn!(limit_ms = limit.as_millis() as u64, "Upstream call timed out");
                ApiError::new(
                    ErrorCode::Timeout,
                    format!("Upstream did not answer within {:?}", limit),
                )
            }
            QueryError::InvalidArgument { field, reason } => {
                ApiError::invalid_input(format!("Invalid {}: {}", field, reason))
            }
            QueryError::Unauthenticated { reason } => ApiError::unauthenticated(reason),
            QueryError::Upstream { status, message } => {
                tracing::error!(status = ?status, error = %message, "Upstream call failed");
                ApiError::upstream("Upstream service request failed")
            }
            QueryError::Decode { reason } => {
                tracing::error!(error = %reason, "Upstream returned an unreadable payload");
                ApiError::upstream("Upstream service returned an invalid response")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        match &err {
            ConfigError::MissingRequired { field } => ApiError::missing_configuration(field),
            ConfigError::InvalidValue { .. } => ApiError::new(
                ErrorCode::MissingConfiguration,
                format!("Invalid configuration: {}", err),
            ),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

/// Result type alias for edge handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_code_status_mapping() {
        assert_eq!(ErrorCode::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::TokenExpired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::UnknownAction.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::UpstreamError.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(ErrorCode::Timeout.status_code(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(
            ErrorCode::MissingConfiguration.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_missing_configuration_is_distinct_from_internal() {
        let err = ApiError::missing_configuration("MONEROO_SECRET_KEY");
        assert_eq!(err.code, ErrorCode::MissingConfiguration);
        assert_ne!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("MONEROO_SECRET_KEY"));
        assert_eq!(
            err.details,
            Some(serde_json::json!({ "setting": "MONEROO_SECRET_KEY" }))
        );
    }

    #[test]
    fn test_query_error_conversion() {
        let err: ApiError = QueryError::Timeout {
            limit: Duration::from_secs(10),
        }
        .into();
        assert_eq!(err.code, ErrorCode::Timeout);

        let err: ApiError = QueryError::upstream_status(500, "secret stack trace").into();
        assert_eq!(err.code, ErrorCode::UpstreamError);
        assert!(!err.message.contains("secret stack trace"));
    }

    #[test]
    fn test_error_serialization() -> Result<(), serde_json::Error> {
        let err = ApiError::unknown_action("refund");
        let json = serde_json::to_string(&err)?;
        assert!(json.contains("UNKNOWN_ACTION"));
        assert!(json.contains("refund"));
        assert!(!json.contains("details"));

        let deserialized: ApiError = serde_json::from_str(&json)?;
        assert_eq!(deserialized, err);
        Ok(())
    }
}
