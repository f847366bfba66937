//! Error type shared by every handler.
//!
//! Internal failures are logged in full; clients only ever see a short
//! generic message in an `{ "error": ... }` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use parlor_types::api::ErrorBody;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The caller referenced a chat that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Anything that went wrong while handling a chat message.
    #[error("failed to process message")]
    Exchange,

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Exchange => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to process message".to_string(),
            ),
            ApiError::Internal(e) => {
                error!(error = ?e, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
