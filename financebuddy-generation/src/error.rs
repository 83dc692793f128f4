//! Error types for question and explanation generation.

use financebuddy_context::ContextError;
use financebuddy_core::error::{Classified, ErrorKind};
use financebuddy_llm::LlmError;
use thiserror::Error;

/// Result alias for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;

/// Errors raised while generating questions or explanations.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Context retrieval failed or degraded below usability.
    #[error("context retrieval failed: {0}")]
    Context(#[from] ContextError),

    /// The LLM adapter failed after its retry envelope was exhausted.
    #[error("llm call failed: {0}")]
    Llm(#[from] LlmError),

    /// Retrieval returned no usable context and fallback is disabled
    /// (spec §4.8 step 2).
    #[error("no context available to generate questions for this topic")]
    InsufficientContext,

    /// A generated question failed structural or grounding validation
    /// after all top-up attempts were exhausted.
    #[error("could not produce {requested} valid questions after top-ups, only {produced} survived validation")]
    ShortfallAfterTopUps { requested: usize, produced: usize },
}

impl Classified for GenerationError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Context(e) => e.kind(),
            Self::Llm(e) => e.kind(),
            Self::InsufficientContext | Self::ShortfallAfterTopUps { .. } => ErrorKind::Generation,
        }
    }
}
