//! Error types for form validation, the remote service and the history ledger.

use thiserror::Error;

/// Message shown when the service fails without a usable detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to generate presentation";

/// Missing or invalid form input. Never reaches the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a topic")]
    MissingTopic,

    #[error("Please attach a PDF document")]
    MissingDocument,

    #[error("Unknown template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown color scheme: {0}")]
    UnknownColorScheme(String),
}

/// Failures reported by (or while talking to) the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("service returned {status}: {}", detail.as_deref().unwrap_or(GENERIC_FAILURE_MESSAGE))]
    Service { status: u16, detail: Option<String> },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl RemoteError {
    /// The service's detail message verbatim, or the generic fallback.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Service {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::InvalidResponse(err.to_string())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

/// Why a submission ended in the failed state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

impl GenerationError {
    /// Message surfaced to the user for the failed state.
    pub fn message(&self) -> String {
        match self {
            GenerationError::Validation(e) => e.to_string(),
            GenerationError::Remote(e) => e.user_message(),
        }
    }
}

/// Storage read/write failures. Swallowed at the history boundary.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}
