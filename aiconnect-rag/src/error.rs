//! Error types for the `aiconnect-rag` crate.

use aiconnect_model::ModelError;
use thiserror::Error;

/// Errors that can occur while ingesting documents or answering questions.
#[derive(Debug, Error)]
pub enum RagError {
    /// The uploaded file's name does not end in a supported extension.
    #[error("Unsupported file format: '{file_name}' (expected .pdf, .docx, .txt, .xlsx or .csv)")]
    UnsupportedFormat {
        /// The rejected file name.
        file_name: String,
    },

    /// The file claims a supported format but its content could not be read.
    #[error("Extraction error ({format}): {message}")]
    ExtractionError {
        /// The declared document format.
        format: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStoreError {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The chat-completion call failed.
    #[error("LLM error: {0}")]
    LlmError(#[from] ModelError),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl RagError {
    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        RagError::VectorStoreError { backend: backend.to_string(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
