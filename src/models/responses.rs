//! Response DTOs for the exchange-rate API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub name: String,
    pub error: String,
}

impl FieldError {
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

/// Extra detail attached to an error body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ErrorMetadata {
    pub fields: Vec<FieldError>,
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorBody {
    /// Error message describing what went wrong
    pub message: String,
    pub metadata: ErrorMetadata,
}

impl ApiErrorBody {
    pub fn new(message: impl Into<String>, fields: Vec<FieldError>) -> Self {
        Self {
            message: message.into(),
            metadata: ErrorMetadata { fields },
        }
    }
}
