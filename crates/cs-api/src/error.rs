//! Error types for cs-api

use thiserror::Error;

/// Remote API errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// Non-success HTTP status (A001)
    #[error("[A001] {message}")]
    Http { status: u16, message: String },

    /// Request could not be sent or timed out (A002)
    #[error("[A002] Request failed: {0}")]
    Transport(String),

    /// Response body was not the expected JSON (A003)
    #[error("[A003] Invalid response body: {0}")]
    Decode(String),
}

/// Result type alias for ApiError
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// HTTP status to report for this error; 500 when no response arrived
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Http { status, .. } => *status,
            ApiError::Transport(_) | ApiError::Decode(_) => 500,
        }
    }

    /// Error text without the code prefix
    pub fn message(&self) -> String {
        match self {
            ApiError::Http { message, .. } => message.clone(),
            ApiError::Transport(message) => format!("Request failed: {}", message),
            ApiError::Decode(message) => format!("Invalid response body: {}", message),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
