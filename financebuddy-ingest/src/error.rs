//! Error types for document processing and ingestion.

use financebuddy_core::error::{Classified, ErrorKind};
use financebuddy_embeddings::EmbeddingError;
use financebuddy_vectorstore::VectorStoreError;
use thiserror::Error;

/// Result alias for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;

/// Severity of a single document's processing error, used in [`IngestReport`](crate::report::IngestReport).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The document was skipped but the run continues unaffected.
    Warning,
    /// The document failed to process.
    Error,
}

/// Errors raised while chunking, tagging, embedding, or persisting documents.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The source file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document was malformed or missing required fields.
    #[error("invalid document in {source}: {message}")]
    InvalidDocument { source: String, message: String },

    /// The embedding provider failed.
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// The vector store failed.
    #[error("vector store failed: {0}")]
    Store(#[from] VectorStoreError),
}

impl Classified for IngestError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::InvalidDocument { .. } => ErrorKind::Validation,
            Self::Embedding(e) => e.kind(),
            Self::Store(e) => e.kind(),
        }
    }
}
