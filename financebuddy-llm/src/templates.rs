//! Prompt templates for the three template families named in spec §4.6:
//! question generation, explanation generation, and follow-up.
//!
//! These functions build plain prompt strings; they embed no
//! model-specific syntax. What they guarantee is the structured context
//! block (enumerated, source-labeled snippets) and an explicit statement
//! of the JSON fields the adapter's response must carry — the exact
//! contract lives in [`crate::types`], not in these strings, but stating
//! it in the prompt keeps a real model's output close enough to parse.

use crate::types::{ContextSnippet, FollowupRequest, QuestionGenRequest};

/// Render a numbered, source-labeled context block shared by every
/// template family.
#[must_use]
pub fn format_context_block(snippets: &[ContextSnippet]) -> String {
    if snippets.is_empty() {
        return "(no context retrieved)".to_string();
    }
    snippets
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[{}] ({}) {}", i + 1, s.source_label, s.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the question-generation prompt (spec §4.6, §4.8).
#[must_use]
pub fn question_generation_prompt(req: &QuestionGenRequest) -> String {
    let mut prompt = format!(
        "Generate {count} multiple-choice questions on \"{topic}\" at {difficulty:?} difficulty, \
         using only the context below. Each question must have exactly four distinct options \
         keyed A-D, one correct answer, a non-empty explanation, and sourceReferences drawn from \
         the bracketed source labels.\n\nContext:\n{context}",
        count = req.count,
        topic = req.topic,
        difficulty = req.difficulty,
        context = format_context_block(&req.context),
    );
    if let Some(hint) = &req.corrective_hint {
        prompt.push_str(&format!(
            "\n\nYour previous response did not conform to the required shape: {hint}. Correct this and respond again."
        ));
    }
    prompt
}

/// Build the explanation-generation prompt (spec §4.6, §4.9).
#[must_use]
pub fn explanation_prompt(req: &crate::types::ExplanationRequest) -> String {
    let mut prompt = format!(
        "Explain why \"{answer}\" is the correct answer to: {question}\nStyle: {style}\nAudience: {audience}\n\
         Keep the explanation under {max_length} characters and cite sources from the context.\n\nContext:\n{context}",
        answer = req.correct_answer_text,
        question = req.question_text,
        style = req.style,
        audience = req.audience,
        max_length = req.max_length,
        context = format_context_block(&req.context),
    );
    if let Some(hint) = &req.corrective_hint {
        prompt.push_str(&format!(
            "\n\nYour previous response did not conform to the required shape: {hint}. Correct this and respond again."
        ));
    }
    prompt
}

/// Build the follow-up prompt (spec §4.6, §4.7).
#[must_use]
pub fn followup_prompt(req: &FollowupRequest) -> String {
    let history = if req.previous_exchanges.is_empty() {
        "(no prior exchanges)".to_string()
    } else {
        req.previous_exchanges
            .iter()
            .map(|e| format!("Q: {}\nA: {}", e.user_question, e.assistant_answer))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let mut prompt = format!(
        "The learner is studying \"{topic}\" and just asked a follow-up question about: {question}\n\n\
         Prior exchanges:\n{history}\n\nContext:\n{context}\n\nAnswer the follow-up question using only the context.",
        topic = req.topic,
        question = req.question,
        context = format_context_block(&req.context),
    );
    if let Some(hint) = &req.corrective_hint {
        prompt.push_str(&format!(
            "\n\nYour previous response did not conform to the required shape: {hint}. Correct this and respond again."
        ));
    }
    prompt
}
