//! HTTP error type for `sitekv` server.
//!
//! Maps record errors onto status codes. Every error body is
//! `{"error": "<message>"}`; storage failures are logged in full and reported
//! to the caller with a generic message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use sitekv_core::RecordError;

/// Application-level error returned from handlers.
#[derive(Debug)]
pub enum AppError {
    /// Requested record not found.
    NotFound(String),
    /// Client sent a malformed or incomplete request.
    BadRequest(String),
    /// Request body exceeded the configured cap.
    PayloadTooLarge(String),
    /// Store or serialization failure.
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorBody { error })).into_response()
    }
}

impl From<RecordError> for AppError {
    fn from(err: RecordError) -> Self {
        match err {
            RecordError::NotFound { ref key, .. } => {
                tracing::debug!(key = %key, "record not found");
                Self::NotFound(err.to_string())
            }
            RecordError::InvalidRequest { reason } => Self::BadRequest(reason),
            RecordError::Serialization { .. } | RecordError::Storage(_) => {
                tracing::error!(error = %err, "record operation failed");
                Self::Internal("Internal server error".to_owned())
            }
        }
    }
}
