//! Question and explanation generation (spec §4.8, §4.9 / C8, C9).
//!
//! Both generators follow the same shape: retrieve grounded context via
//! `financebuddy-context`, call the injected `financebuddy-llm` adapter,
//! then validate the result before handing it back to a caller (the flow
//! manager).

pub mod error;
pub mod explanation_generator;
pub mod question_generator;

pub use error::{GenerationError, Result};
pub use explanation_generator::{ExplanationGenerator, ExplanationOutcome};
pub use question_generator::{GenerationStats, QuestionGenerator, DEFAULT_MIN_RELEVANCE_SCORE};
