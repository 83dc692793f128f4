//! Deterministic stub adapter used by tests and local development without
//! a configured upstream model.

use async_trait::async_trait;
use financebuddy_core::OptionKey;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{LlmError, Result};
use crate::traits::LlmAdapter;
use crate::types::{
    AnswerCheckRequest, AnswerCheckResponse, ExplanationRequest, ExplanationResponse,
    FollowupRequest, FollowupResponse, GeneratedQuestion, QuestionGenRequest,
};

/// Deterministic stub adapter: builds canned, schema-valid responses from
/// the request fields so callers (and their tests) never touch a real
/// model, per spec §9's design note on deterministic test doubles.
#[derive(Debug, Default)]
pub struct StubLlmAdapter;

#[async_trait]
impl LlmAdapter for StubLlmAdapter {
    fn name(&self) -> &str {
        "stub"
    }

    async fn generate_questions_once(&self, req: &QuestionGenRequest) -> Result<Vec<GeneratedQuestion>> {
        let source_refs: Vec<String> = req.context.iter().map(|s| s.source_label.clone()).collect();
        let questions = (0..req.count)
            .map(|i| {
                let mut options = BTreeMap::new();
                options.insert(OptionKey::A, format!("{} — option A for item {i}", req.topic));
                options.insert(OptionKey::B, format!("{} — option B for item {i}", req.topic));
                options.insert(OptionKey::C, format!("{} — option C for item {i}", req.topic));
                options.insert(OptionKey::D, format!("{} — option D for item {i}", req.topic));
                GeneratedQuestion {
                    question_text: format!("Question {i} about {}?", req.topic),
                    options,
                    correct_answer: OptionKey::A,
                    explanation: format!("Option A is correct because of {}.", req.topic),
                    source_references: source_refs.clone(),
                    difficulty: req.difficulty,
                }
            })
            .collect();
        Ok(questions)
    }

    async fn generate_answers_once(&self, req: &AnswerCheckRequest) -> Result<AnswerCheckResponse> {
        let correct_answer = req
            .options
            .keys()
            .next()
            .copied()
            .ok_or_else(|| LlmError::SchemaInvalid("no options supplied".to_string()))?;
        Ok(AnswerCheckResponse {
            correct_answer,
            rationale: format!("Derived from: {}", req.question_text),
        })
    }

    async fn generate_explanation_once(&self, req: &ExplanationRequest) -> Result<ExplanationResponse> {
        let source_refs = req.context.iter().map(|s| s.source_label.clone()).collect();
        let explanation = format!("The correct answer is {}.", req.correct_answer_text);
        Ok(ExplanationResponse {
            explanation: explanation.chars().take(req.max_length.max(1)).collect(),
            source_references: source_refs,
        })
    }

    async fn generate_followup_response_once(&self, req: &FollowupRequest) -> Result<FollowupResponse> {
        Ok(FollowupResponse {
            answer: format!("Regarding \"{}\": see the context on {}.", req.question, req.topic),
        })
    }
}

/// A test double whose `*_once` calls fail with [`LlmError::UpstreamUnavailable`]
/// a fixed number of times before succeeding, for exercising retry paths.
#[derive(Debug)]
pub struct FlakyLlmAdapter {
    inner: StubLlmAdapter,
    failures_remaining: AtomicUsize,
}

impl FlakyLlmAdapter {
    /// Construct an adapter that fails its first `failures` attempts
    /// (across any method) before delegating to a working stub.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            inner: StubLlmAdapter,
            failures_remaining: AtomicUsize::new(failures),
        }
    }

    fn should_fail(&self) -> bool {
        let mut current = self.failures_remaining.load(Ordering::SeqCst);
        loop {
            if current == 0 {
                return false;
            }
            match self.failures_remaining.compare_exchange(
                current,
                current - 1,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(observed) => current = observed,
            }
        }
    }
}

#[async_trait]
impl LlmAdapter for FlakyLlmAdapter {
    fn name(&self) -> &str {
        "flaky-stub"
    }

    async fn generate_questions_once(&self, req: &QuestionGenRequest) -> Result<Vec<GeneratedQuestion>> {
        if self.should_fail() {
            return Err(LlmError::UpstreamUnavailable("flaky stub induced failure".to_string()));
        }
        self.inner.generate_questions_once(req).await
    }

    async fn generate_answers_once(&self, req: &AnswerCheckRequest) -> Result<AnswerCheckResponse> {
        if self.should_fail() {
            return Err(LlmError::UpstreamUnavailable("flaky stub induced failure".to_string()));
        }
        self.inner.generate_answers_once(req).await
    }

    async fn generate_explanation_once(&self, req: &ExplanationRequest) -> Result<ExplanationResponse> {
        if self.should_fail() {
            return Err(LlmError::UpstreamUnavailable("flaky stub induced failure".to_string()));
        }
        self.inner.generate_explanation_once(req).await
    }

    async fn generate_followup_response_once(&self, req: &FollowupRequest) -> Result<FollowupResponse> {
        if self.should_fail() {
            return Err(LlmError::UpstreamUnavailable("flaky stub induced failure".to_string()));
        }
        self.inner.generate_followup_response_once(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::Difficulty;

    fn sample_request() -> QuestionGenRequest {
        QuestionGenRequest {
            topic: "Options".to_string(),
            context: Vec::new(),
            count: 2,
            difficulty: Difficulty::Beginner,
            corrective_hint: None,
        }
    }

    #[tokio::test]
    async fn stub_generates_requested_count_with_distinct_options() {
        let adapter = StubLlmAdapter;
        let questions = adapter.generate_questions(&sample_request()).await.unwrap();
        assert_eq!(questions.len(), 2);
        for q in &questions {
            assert_eq!(q.options.len(), 4);
        }
    }

    #[tokio::test]
    async fn flaky_adapter_succeeds_after_retry_envelope_absorbs_failures() {
        let adapter = FlakyLlmAdapter::new(1);
        let questions = adapter.generate_questions(&sample_request()).await.unwrap();
        assert_eq!(questions.len(), 2);
    }

    #[tokio::test]
    async fn flaky_adapter_exhausts_retries_and_propagates_error() {
        let adapter = FlakyLlmAdapter::new(10);
        let err = adapter.generate_questions(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::UpstreamUnavailable(_)));
    }
}
