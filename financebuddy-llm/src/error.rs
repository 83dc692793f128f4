//! Error types for the LLM adapter contract.

use financebuddy_core::error::{Classified, ErrorKind};
use thiserror::Error;

/// Result alias for LLM adapter operations.
pub type Result<T> = std::result::Result<T, LlmError>;

/// Errors an [`crate::LlmAdapter`] can raise.
#[derive(Debug, Error)]
pub enum LlmError {
    /// A transient failure (rate limit, connection reset) retried past its
    /// backoff cap without success.
    #[error("llm provider unavailable after retries: {0}")]
    UpstreamUnavailable(String),

    /// The call did not complete within its per-call timeout.
    #[error("llm call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The provider's response did not conform to the required JSON shape,
    /// even after a corrective re-prompt.
    #[error("llm response failed schema validation: {0}")]
    SchemaInvalid(String),

    /// A non-retryable failure (bad auth, rejected request).
    #[error("llm provider rejected request: {0}")]
    Permanent(String),
}

impl Classified for LlmError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::UpstreamUnavailable(_) | Self::Timeout(_) => ErrorKind::UpstreamUnavailable,
            Self::SchemaInvalid(_) => ErrorKind::Generation,
            Self::Permanent(_) => ErrorKind::Validation,
        }
    }
}
