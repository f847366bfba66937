use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx reply; `message` is the server's `error` field when present.
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("chat not found: {0}")]
    NotFound(Uuid),

    #[error("local storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("invalid local storage data: {0}")]
    Json(#[from] serde_json::Error),
}
