//! # API Error Types
//!
//! Maps submission failures onto HTTP status codes with a JSON body:
//!
//! | Failure                               | Status |
//! |---------------------------------------|--------|
//! | bad signature, malformed document     | 400    |
//! | canary invalid on its own             | 422    |
//! | canary cannot follow the current one  | 409    |
//! | store append failed                   | 500    |
//!
//! Internal error details are logged, never returned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use canary_state::SubmitError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable code, e.g. `"CONFLICT"`.
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// Application-level error type implementing [`IntoResponse`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Proof cannot be opened or parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Canary is invalid in isolation (422).
    #[error("validation error: {0}")]
    Validation(String),

    /// Canary conflicts with the current chain head (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request body over the size cap (413).
    #[error("payload too large: {0}")]
    PayloadTooLarge(String),

    /// Internal server error (500). Logged, not returned.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// HTTP status and machine-readable code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Text returned to the client.
    fn public_message(&self) -> String {
        match self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            Self::NotFound(m)
            | Self::BadRequest(m)
            | Self::Validation(m)
            | Self::Conflict(m)
            | Self::PayloadTooLarge(m) => m.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        if matches!(&self, Self::Internal(_)) {
            tracing::error!(error = %self, "internal server error");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.public_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match &err {
            SubmitError::Proof(_) => Self::BadRequest(err.to_string()),
            SubmitError::Format(_) => Self::Validation(err.to_string()),
            SubmitError::Succession(_) => Self::Conflict(err.to_string()),
            SubmitError::Storage(source) => Self::Internal(format!("{err}: {source}")),
        }
    }
}
