//! Error types for the context retrieval pipeline.

use financebuddy_core::error::{Classified, ErrorKind};
use financebuddy_embeddings::EmbeddingError;
use financebuddy_vectorstore::VectorStoreError;
use thiserror::Error;

/// Result alias for context retrieval operations.
pub type Result<T> = std::result::Result<T, ContextError>;

/// Errors raised by the context retriever and reranker.
#[derive(Debug, Error)]
pub enum ContextError {
    /// The embedding provider failed while embedding a query.
    #[error("failed to embed query: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The vector store backend is unavailable. Retrieval falls back to a
    /// degraded path rather than always propagating this.
    #[error("vector store degraded: {0}")]
    StoreUnavailable(#[from] VectorStoreError),
}

impl Classified for ContextError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Embedding(e) => e.kind(),
            Self::StoreUnavailable(_) => ErrorKind::RetrievalDegraded,
        }
    }
}
