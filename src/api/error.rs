//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::pricing::{PriceError, UpstreamError};

/// Body returned by proxy routes when the upstream fetch fails
pub const UPSTREAM_ERROR_MESSAGE: &str = "Error fetching data";

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream fetch for a proxied route failed
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Upstream answered with a body we could not use
    #[error("Price error: {0}")]
    Price(#[from] PriceError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

/// Proxy failure body: `{"error": "Error fetching data"}`
#[derive(Serialize)]
struct UpstreamErrorResponse {
    error: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let request_id = uuid::Uuid::new_v4().to_string();

        if let ApiError::Upstream(e) = &self {
            tracing::error!(request_id = %request_id, error = %e, "Upstream fetch failed");
            let body = UpstreamErrorResponse {
                error: UPSTREAM_ERROR_MESSAGE,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }

        let (status, code) = match &self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ApiError::Price(_) => (StatusCode::BAD_GATEWAY, "PRICE_ERROR"),
            ApiError::Upstream(_) | ApiError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        };

        // Log the error
        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
