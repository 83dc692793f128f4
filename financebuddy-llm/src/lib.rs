//! Prompt templates and the LLM adapter contract (spec §4.6, §4.7 / C6, C7).

mod error;
mod retry;
mod stub;
mod templates;
mod traits;
mod types;

pub use error::{LlmError, Result};
pub use retry::BackoffPolicy;
pub use stub::{FlakyLlmAdapter, StubLlmAdapter};
pub use templates::{explanation_prompt, followup_prompt, format_context_block, question_generation_prompt};
pub use traits::LlmAdapter;
pub use types::{
    AnswerCheckRequest, AnswerCheckResponse, ContextSnippet, ExplanationRequest, ExplanationResponse,
    FollowupRequest, FollowupResponse, GeneratedQuestion, QuestionGenRequest,
};
