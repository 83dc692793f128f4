//! Shared error taxonomy for FinanceBuddy
//!
//! Every crate in the workspace defines its own `thiserror`-derived error
//! type for its public surface, but each implements [`kind`](Classified::kind)
//! so a caller (notionally, an HTTP layer) can map any error in the system
//! to a stable status-code family without depending on a crate's concrete
//! error enum.

use thiserror::Error;

/// Classification of an error, independent of which component raised it.
///
/// Mirrors the error taxonomy kinds from the system design: each variant
/// corresponds to a response-status family a caller would map this to,
/// without this crate knowing anything about HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input shape; recoverable by the caller.
    Validation,
    /// Unknown or expired identifier.
    NotFound,
    /// State machine rejected an action.
    Conflict,
    /// LLM produced invalid or empty content after retries.
    Generation,
    /// Vector store unavailable; retrieval degraded or fell back.
    RetrievalDegraded,
    /// Embedding or LLM provider unavailable after retry exhaustion.
    UpstreamUnavailable,
    /// Retryable internally; should never escape a well-behaved caller.
    Transient,
    /// Configuration or schema problem that must stop startup.
    Fatal,
}

/// Implemented by every crate-local error enum so callers can classify
/// errors uniformly regardless of which component produced them.
pub trait Classified {
    /// Returns the stable classification for this error.
    fn kind(&self) -> ErrorKind;
}

/// Generic error surfaced directly by `financebuddy-core` itself
/// (identifier parsing, content model validation).
#[derive(Debug, Error)]
pub enum CoreError {
    /// A `Document`, `Question`, or `Session` invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Failed to parse an identifier from its string form.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

impl Classified for CoreError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::InvariantViolation(_) | Self::InvalidId(_) => ErrorKind::Validation,
        }
    }
}

/// Result alias for `financebuddy-core` operations.
pub type Result<T> = std::result::Result<T, CoreError>;
