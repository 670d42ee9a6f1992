//! Domain errors for the fooddb embedding and search subsystem.

use thiserror::Error;

/// Domain-level errors that can occur in the fooddb system.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Embedding index was created with dimension {found}, requested {expected}")]
    SchemaMismatch { expected: usize, found: usize },

    #[error("Vector dimension mismatch: index expects {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("Embedding generation failed: {0}")]
    EmbeddingFailed(String),

    #[error("Query text must not be empty")]
    InvalidQuery,

    #[error("Embedding service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl DomainError {
    /// Errors that abort an entire pipeline run instead of a single
    /// sub-batch: the index and the model disagree, so no work unit
    /// can be safely attempted.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DomainError::SchemaMismatch { .. } | DomainError::DimensionMismatch { .. }
        )
    }
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
