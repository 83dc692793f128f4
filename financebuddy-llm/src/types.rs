//! Request/response payloads exchanged with an [`crate::LlmAdapter`]
//! (spec §4.7). These are the exact fields the core requires back; a
//! concrete adapter is responsible for mapping them to and from whatever
//! wire format its upstream model actually speaks.

use financebuddy_core::{Difficulty, FollowupExchange, OptionKey};
use std::collections::BTreeMap;

/// A single context snippet passed to the model, with its source label so
/// generated `sourceReferences` can be checked against what was actually
/// shown.
#[derive(Debug, Clone)]
pub struct ContextSnippet {
    pub source_label: String,
    pub text: String,
}

/// Request for `generateQuestions` (spec §4.7).
#[derive(Debug, Clone)]
pub struct QuestionGenRequest {
    pub topic: String,
    pub context: Vec<ContextSnippet>,
    pub count: usize,
    pub difficulty: Difficulty,
    /// Set on a retry after a schema-validation failure; the adapter
    /// should fold this into the prompt as a corrective instruction.
    pub corrective_hint: Option<String>,
}

/// A single generated question, mirroring [`financebuddy_core::Question`]
/// minus the fields only the core assigns (`id`, `created_at`).
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub options: BTreeMap<OptionKey, String>,
    pub correct_answer: OptionKey,
    pub explanation: String,
    pub source_references: Vec<String>,
    pub difficulty: Difficulty,
}

/// Request for `generateAnswers` (spec §4.7); used for validation only.
#[derive(Debug, Clone)]
pub struct AnswerCheckRequest {
    pub question_text: String,
    pub options: BTreeMap<OptionKey, String>,
    pub context: Vec<ContextSnippet>,
    pub corrective_hint: Option<String>,
}

/// Response to `generateAnswers`.
#[derive(Debug, Clone)]
pub struct AnswerCheckResponse {
    pub correct_answer: OptionKey,
    pub rationale: String,
}

/// Request for `generateExplanation` (spec §4.7 / §4.9).
#[derive(Debug, Clone)]
pub struct ExplanationRequest {
    pub question_text: String,
    pub correct_answer_text: String,
    pub context: Vec<ContextSnippet>,
    pub style: String,
    pub audience: String,
    pub max_length: usize,
    pub corrective_hint: Option<String>,
}

/// Response to `generateExplanation`.
#[derive(Debug, Clone)]
pub struct ExplanationResponse {
    pub explanation: String,
    pub source_references: Vec<String>,
}

/// Request for `generateFollowupResponse` (spec §4.7).
#[derive(Debug, Clone)]
pub struct FollowupRequest {
    pub question: String,
    pub context: Vec<ContextSnippet>,
    pub topic: String,
    pub previous_exchanges: Vec<FollowupExchange>,
    pub corrective_hint: Option<String>,
}

/// Response to `generateFollowupResponse`.
#[derive(Debug, Clone)]
pub struct FollowupResponse {
    pub answer: String,
}
