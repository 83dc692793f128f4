//! Error types for vector store operations.

use financebuddy_core::error::{Classified, ErrorKind};
use thiserror::Error;

/// Result alias for vector store operations.
pub type Result<T> = std::result::Result<T, VectorStoreError>;

/// Errors a [`VectorStore`](crate::VectorStore) can raise.
#[derive(Debug, Error)]
pub enum VectorStoreError {
    /// A document was upserted without an embedding.
    #[error("document {id} has no embedding")]
    MissingEmbedding { id: String },

    /// A document's embedding dimension does not match the collection's.
    #[error("document {id} has embedding dimension {actual}, expected {expected}")]
    DimensionMismatch {
        id: String,
        expected: usize,
        actual: usize,
    },

    /// The backing driver is unreachable (spec: "degraded retrieval").
    #[error("vector store backend unavailable: {0}")]
    BackendUnavailable(String),

    /// Requested document id does not exist.
    #[error("document not found: {0}")]
    NotFound(String),
}

impl Classified for VectorStoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingEmbedding { .. } | Self::DimensionMismatch { .. } => {
                ErrorKind::Validation
            }
            Self::BackendUnavailable(_) => ErrorKind::RetrievalDegraded,
            Self::NotFound(_) => ErrorKind::NotFound,
        }
    }
}
