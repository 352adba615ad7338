//! API error types and responses.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use raffle_core::RaffleError;
use raffle_store::StoreError;

/// Message returned when a required body field is absent.
pub const MISSING_FIELDS: &str = "Missing required fields";

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Wrong or missing admin credentials.
    #[error("invalid PIN")]
    Unauthorized,

    /// Entry not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad request - missing or invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Conflict - the slot is already taken.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Invalid PIN".to_string(),
            ),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "slot_taken", msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::SlotTaken { .. } => Self::Conflict(err.to_string()),
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Database(msg) | StoreError::Corrupt(msg) | StoreError::Migration(msg) => {
                Self::Internal(msg)
            }
        }
    }
}

impl From<RaffleError> for ApiError {
    fn from(err: RaffleError) -> Self {
        match err {
            RaffleError::MissingField(_) => Self::BadRequest(MISSING_FIELDS.into()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

/// `Json` extractor whose rejections use the API error format.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
