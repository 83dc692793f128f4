//! Error types for the flow state machine and manager.

use financebuddy_context::ContextError;
use financebuddy_core::error::{Classified, ErrorKind};
use financebuddy_generation::GenerationError;
use financebuddy_llm::LlmError;
use financebuddy_sessions::SessionError;
use thiserror::Error;

use crate::controller::FlowAction;

/// Result alias for flow operations.
pub type Result<T> = std::result::Result<T, FlowError>;

/// Errors raised by the flow controller and manager (spec §4.11, §4.12).
#[derive(Debug, Error)]
pub enum FlowError {
    /// The session store rejected the operation (not found, expired, or
    /// a concurrent-update conflict at the storage layer).
    #[error("session store error: {0}")]
    Session(#[from] SessionError),

    /// The requested action is not legal from the session's current step;
    /// carries the allowed set so a caller can render it (spec §4.11).
    #[error("{attempted:?} is not valid from the current step; allowed actions: {allowed:?}")]
    InvalidTransition {
        attempted: FlowAction,
        allowed: Vec<FlowAction>,
    },

    /// A second action was attempted on this session while one was
    /// already in flight (spec §4.12, §5).
    #[error("another flow action is already in progress for this session")]
    Busy,

    /// Question or explanation generation failed.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// The LLM adapter failed (follow-up turns call it directly).
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    /// Context retrieval failed (follow-up turns retrieve context directly).
    #[error("context retrieval failed: {0}")]
    Context(#[from] ContextError),
}

impl Classified for FlowError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Session(e) => e.kind(),
            Self::InvalidTransition { .. } | Self::Busy => ErrorKind::Conflict,
            Self::Generation(e) => e.kind(),
            Self::Llm(e) => e.kind(),
            Self::Context(e) => e.kind(),
        }
    }
}
