//! Error types for the `aiconnect-model` crate.

use thiserror::Error;

/// Errors that can occur when talking to a chat-completion backend.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The request could not be built from the given messages or settings.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The backend rejected the call or could not be reached.
    #[error("{provider} API error: {message}")]
    Api {
        /// The backend that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The backend answered without any generated text.
    #[error("{provider} returned no content")]
    EmptyResponse {
        /// The backend that produced the empty answer.
        provider: String,
    },

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for [`ModelError`].
pub type Result<T> = std::result::Result<T, ModelError>;
