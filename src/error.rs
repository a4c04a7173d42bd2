//! Error types for the petition API and its cache layer
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::repository::RepoError;
use crate::response::build_error_response;

// == API Error Enum ==
/// Errors a handler can surface to the client.
///
/// Every variant except [`ApiError::Unknown`] has a fixed status code.
/// `Unknown` carries an optional status; when absent the caller's default
/// is used (see [`build_error_response`]).
#[derive(Error, Debug)]
pub enum ApiError {
    /// Client input malformed or missing
    #[error("{0}")]
    Validation(String),

    /// Caller identity missing
    #[error("{0}")]
    Unauthorized(String),

    /// Resource absent
    #[error("{0}")]
    NotFound(String),

    /// Route exists but not for this method
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// Write rejected because of existing state, e.g. a duplicate signature
    #[error("{0}")]
    Conflict(String),

    /// Anything else
    #[error("{message}")]
    Unknown {
        message: String,
        status: Option<StatusCode>,
    },
}

impl ApiError {
    /// Shorthand for an unknown error without an explicit status.
    pub fn unknown(message: impl Into<String>) -> Self {
        ApiError::Unknown {
            message: message.into(),
            status: None,
        }
    }

    // == Status ==
    /// Resolves the HTTP status, falling back to `default` when the error has none.
    pub fn status_or(&self, default: StatusCode) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unknown { status, .. } => status.unwrap_or(default),
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            RepoError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            RepoError::Invalid(msg) => ApiError::Validation(msg),
            RepoError::Backend(msg) => ApiError::unknown(msg),
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::unknown(format!("Serialization failed: {}", err))
    }
}

impl From<String> for ApiError {
    fn from(message: String) -> Self {
        ApiError::unknown(message)
    }
}

impl From<&str> for ApiError {
    fn from(message: &str) -> Self {
        ApiError::unknown(message)
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        build_error_response(self, StatusCode::INTERNAL_SERVER_ERROR)
    }
}

// == Store Error Enum ==
/// Failures of the cache store itself.
///
/// These never reach the client; the response cache degrades to direct
/// computation when it sees one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable or poisoned
    #[error("Cache store unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded the store timeout budget
    #[error("Cache store timed out after {0}ms")]
    Timeout(u64),

    /// Entry refused, e.g. key or value over the size limits
    #[error("Cache store rejected entry: {0}")]
    Rejected(String),
}

// == Result Type Aliases ==
/// Convenience Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Convenience Result type for cache store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
