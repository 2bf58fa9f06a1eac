//! Error types for the `evqa-rag` crate.

use thiserror::Error;

use crate::orchestrator::OrchestratorState;

/// Errors that can occur while loading data, building the index, or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// Bad or missing setup. Fatal, surfaced before any query is possible.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A record lacks a field the document template references.
    #[error("Record {record} is missing field '{field}'")]
    MissingField {
        /// Row index of the offending record.
        record: usize,
        /// The missing canonical field name.
        field: String,
    },

    /// The embedding backend failed, timed out, or rejected the request.
    #[error("Embedding unavailable ({provider}): {message}")]
    EmbeddingUnavailable {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation backend failed, timed out, or rejected the request.
    #[error("Generation unavailable ({provider}): {message}")]
    GenerationUnavailable {
        /// The completion model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error raised by the vector index backend.
    #[error("Index error ({backend}): {message}")]
    Index {
        /// The index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The dataset could not be read or parsed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// A query arrived while the orchestrator was not ready to serve it.
    #[error("Orchestrator is not ready (state: {state})")]
    NotReady {
        /// The state the orchestrator was in.
        state: OrchestratorState,
    },

    /// The question itself cannot be answered (blank, for instance).
    #[error("Invalid question: {0}")]
    InvalidQuestion(String),
}

impl RagError {
    /// Whether the error only affects the current query.
    ///
    /// Recoverable errors leave the orchestrator serving; the caller may
    /// retry or move on to the next question.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RagError::EmbeddingUnavailable { .. }
                | RagError::GenerationUnavailable { .. }
                | RagError::InvalidQuestion(_)
        )
    }
}

impl From<csv::Error> for RagError {
    fn from(err: csv::Error) -> Self {
        RagError::Dataset(err.to_string())
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
