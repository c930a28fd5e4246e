//! HTTP error type for wardrobe-tryon
//!
//! Maps the orchestration taxonomy onto status codes:
//! missing file → 404, incomplete request → 400, upstream failures → 502.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{StorageError, TryOnError};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Upstream service failed (502)
    #[error("Upstream error: {0}")]
    BadGateway(String),

    /// Collaborator not configured (503)
    #[error("Service unavailable: {0}")]
    Unavailable(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<TryOnError> for ApiError {
    fn from(err: TryOnError) -> Self {
        match err {
            TryOnError::FileNotFound { .. } => ApiError::NotFound(err.to_string()),
            TryOnError::MissingInput(_) | TryOnError::InvalidTaskId(_) => {
                ApiError::BadRequest(err.to_string())
            }
            TryOnError::Storage {
                source: StorageError::NotConfigured(_),
                ..
            } => ApiError::Unavailable(err.to_string()),
            TryOnError::Storage { .. } | TryOnError::Submission { .. } | TryOnError::Poll { .. } => {
                ApiError::BadGateway(err.to_string())
            }
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::BadGateway(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let (error_code, message) = match self {
            ApiError::NotFound(msg) => ("NOT_FOUND", msg),
            ApiError::BadRequest(msg) => ("BAD_REQUEST", msg),
            ApiError::BadGateway(msg) => ("UPSTREAM_ERROR", msg),
            ApiError::Unavailable(msg) => ("NOT_CONFIGURED", msg),
            ApiError::Internal(msg) => ("INTERNAL_ERROR", msg),
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
