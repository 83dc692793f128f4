//! Error types for embedding generation.

use financebuddy_core::error::{Classified, ErrorKind};
use thiserror::Error;

/// Result alias for embedding operations.
pub type Result<T> = std::result::Result<T, EmbeddingError>;

/// Errors an [`EmbeddingProvider`](crate::EmbeddingProvider) can raise.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    /// A transient failure (rate limit, timeout) that was retried past
    /// its backoff cap without success.
    #[error("embedding provider unavailable after retries: {0}")]
    UpstreamUnavailable(String),

    /// A non-retryable failure (bad auth, malformed request).
    #[error("embedding provider rejected request: {0}")]
    Permanent(String),
}

impl Classified for EmbeddingError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable(_) => ErrorKind::UpstreamUnavailable,
            Self::Permanent(_) => ErrorKind::Validation,
        }
    }
}
