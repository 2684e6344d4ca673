//! HTTP error responses
//!
//! Every handler error becomes `{"error": {"code", "message"}}` with a
//! matching status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::archive::ArchiveError;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Participant store query failed (500)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resume archive could not be produced (500, or 504 on timeout)
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            ApiError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            ApiError::Archive(ArchiveError::Timeout(_)) => {
                (StatusCode::GATEWAY_TIMEOUT, "ARCHIVE_TIMEOUT")
            }
            ApiError::Archive(_) => (StatusCode::INTERNAL_SERVER_ERROR, "ARCHIVE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        error!(code = error_code, error = %self, "Request failed");

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
