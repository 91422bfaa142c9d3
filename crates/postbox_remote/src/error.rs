//! Error types for the remote service boundary.

use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Errors returned by a template service.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {error_code} (HTTP {status}): {message}")]
    Api {
        status: u16,
        error_code: i64,
        message: String,
    },

    #[error("Template not found: {0}")]
    NotFound(String),

    #[error("Invalid client configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RemoteError {
    /// Build an API error with a 422 status, as the server reports rejected requests.
    pub fn api(error_code: i64, message: impl Into<String>) -> Self {
        RemoteError::Api {
            status: 422,
            error_code,
            message: message.into(),
        }
    }
}
