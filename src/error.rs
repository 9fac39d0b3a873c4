//! Error types for the cache and the exchange-rate API
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{ApiErrorBody, FieldError};

// == Cache Error Enum ==
/// Errors raised by the expiring cache itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Bulk enumeration is deliberately not offered
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

// == API Error Enum ==
/// Errors surfaced by the HTTP layer.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Malformed or contradictory request
    #[error("{0}")]
    InvalidRequest(String),

    /// One or more request fields failed validation
    #[error("Invalid arguments")]
    Validation(Vec<FieldError>),

    /// No rate stored for the requested pair/date
    #[error("{0}")]
    NotFound(String),

    /// The per-request latency budget was exceeded
    #[error("Service hasn't responded in time, please try again later.")]
    Timeout,

    /// Unexpected failure
    #[error("Unexpected error, please try again later.")]
    Internal(String),
}

impl From<CacheError> for ApiError {
    fn from(err: CacheError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidRequest(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = self.to_string();
        let fields = match self {
            ApiError::Validation(fields) => fields,
            _ => Vec::new(),
        };

        (status, Json(ApiErrorBody::new(message, fields))).into_response()
    }
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Convenience Result type for handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
