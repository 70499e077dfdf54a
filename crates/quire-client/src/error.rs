use quire_core::StateError;
use thiserror::Error;

/// Result of one backend call
pub type ApiResult<T> = Result<T, ApiError>;

/// Normalized failure of a backend call
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    Url(String),

    /// Missing or invalid credentials; the session must be dropped
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The server refused the operation
    #[error("{0}")]
    Rejected(String),

    /// The expected payload was absent (not found or no permission)
    #[error("{0}")]
    NotFound(String),

    #[error("Request cancelled")]
    Cancelled,
}

impl ApiError {
    /// Human-readable message for alerts and inline errors
    pub fn message(&self) -> String {
        match self {
            ApiError::Unauthorized(msg) | ApiError::Rejected(msg) | ApiError::NotFound(msg) => {
                msg.clone()
            }
            other => other.to_string(),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

/// Failure of a context handler
#[derive(Error, Debug)]
pub enum ActionError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    State(#[from] StateError),
}

impl ActionError {
    pub fn message(&self) -> String {
        match self {
            ActionError::Api(err) => err.message(),
            ActionError::State(err) => err.to_string(),
        }
    }

    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ActionError::Api(err) if err.is_auth_failure())
    }
}
