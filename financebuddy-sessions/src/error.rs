//! Error types for session store operations.

use financebuddy_core::error::{Classified, ErrorKind};
use thiserror::Error;

/// Result alias for session store operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised by a [`crate::SessionStore`].
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session exists for the given id, or it has expired (spec §3:
    /// any operation on an expired session fails as `NotFound`).
    #[error("session not found or expired: {0}")]
    NotFound(financebuddy_core::SessionId),

    /// A concurrent `update` lost the compare-and-swap race; the caller
    /// should retry (spec §4.10).
    #[error("concurrent update conflict on session {0}")]
    Conflict(financebuddy_core::SessionId),

    /// The caller's mutator rejected the update (e.g. a mutator that
    /// enforces its own precondition on current session state).
    #[error("session update rejected: {0}")]
    Rejected(String),
}

impl Classified for SessionError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Rejected(_) => ErrorKind::Validation,
        }
    }
}
