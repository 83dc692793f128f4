//! The LLM adapter capability contract (spec §4.7 / C7).

use async_trait::async_trait;

use crate::error::{LlmError, Result};
use crate::retry::BackoffPolicy;
use crate::types::{
    AnswerCheckRequest, AnswerCheckResponse, ExplanationRequest, ExplanationResponse,
    FollowupRequest, FollowupResponse, GeneratedQuestion, QuestionGenRequest,
};

fn is_retryable(err: &LlmError) -> bool {
    matches!(err, LlmError::UpstreamUnavailable(_) | LlmError::SchemaInvalid(_) | LlmError::Timeout(_))
}

/// Generates structured tutoring content from retrieved context.
///
/// Implementations provide the four `*_once` methods (a single attempt,
/// with no retry logic of their own); this trait's default methods add
/// the retry/backoff/timeout/corrective-reprompt envelope spec §4.7
/// requires uniformly across every operation, so a concrete adapter only
/// has to worry about talking to its model and parsing the result.
#[async_trait]
pub trait LlmAdapter: Send + Sync {
    /// Adapter name (e.g. `"stub"`, `"gpt-4o"`).
    fn name(&self) -> &str;

    /// The backoff/timeout policy this adapter's default methods apply.
    /// Override to change retry behavior; the spec's default is 3
    /// attempts with a 30s per-call timeout.
    fn policy(&self) -> BackoffPolicy {
        BackoffPolicy::default()
    }

    /// A single attempt at `generateQuestions`, with no retry.
    async fn generate_questions_once(&self, req: &QuestionGenRequest) -> Result<Vec<GeneratedQuestion>>;

    /// A single attempt at `generateAnswers`, with no retry.
    async fn generate_answers_once(&self, req: &AnswerCheckRequest) -> Result<AnswerCheckResponse>;

    /// A single attempt at `generateExplanation`, with no retry.
    async fn generate_explanation_once(&self, req: &ExplanationRequest) -> Result<ExplanationResponse>;

    /// A single attempt at `generateFollowupResponse`, with no retry.
    async fn generate_followup_response_once(&self, req: &FollowupRequest) -> Result<FollowupResponse>;

    /// Generate questions, retrying on transient and schema-validation
    /// failures with a corrective hint folded into the re-prompt.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if every attempt fails or the per-call
    /// timeout elapses on the final attempt.
    async fn generate_questions(&self, req: &QuestionGenRequest) -> Result<Vec<GeneratedQuestion>> {
        let policy = self.policy();
        let base = req.clone();
        policy
            .retry(
                |attempt| {
                    let mut attempt_req = base.clone();
                    if attempt > 1 {
                        attempt_req.corrective_hint = attempt_req.corrective_hint.or_else(|| {
                            Some("response must be valid JSON matching the documented question schema".to_string())
                        });
                    }
                    let timeout = policy.call_timeout;
                    async move {
                        tokio::time::timeout(timeout, self.generate_questions_once(&attempt_req))
                            .await
                            .unwrap_or(Err(LlmError::Timeout(timeout)))
                    }
                },
                is_retryable,
            )
            .await
    }

    /// Generate an answer check, with the same retry envelope as
    /// [`Self::generate_questions`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if every attempt fails.
    async fn generate_answers(&self, req: &AnswerCheckRequest) -> Result<AnswerCheckResponse> {
        let policy = self.policy();
        let base = req.clone();
        policy
            .retry(
                |attempt| {
                    let mut attempt_req = base.clone();
                    if attempt > 1 {
                        attempt_req.corrective_hint =
                            attempt_req.corrective_hint.or_else(|| Some("respond with valid JSON".to_string()));
                    }
                    let timeout = policy.call_timeout;
                    async move {
                        tokio::time::timeout(timeout, self.generate_answers_once(&attempt_req))
                            .await
                            .unwrap_or(Err(LlmError::Timeout(timeout)))
                    }
                },
                is_retryable,
            )
            .await
    }

    /// Generate an explanation, with the same retry envelope as
    /// [`Self::generate_questions`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if every attempt fails.
    async fn generate_explanation(&self, req: &ExplanationRequest) -> Result<ExplanationResponse> {
        let policy = self.policy();
        let base = req.clone();
        policy
            .retry(
                |attempt| {
                    let mut attempt_req = base.clone();
                    if attempt > 1 {
                        attempt_req.corrective_hint = attempt_req.corrective_hint.or_else(|| {
                            Some("response must be valid JSON matching the documented explanation schema".to_string())
                        });
                    }
                    let timeout = policy.call_timeout;
                    async move {
                        tokio::time::timeout(timeout, self.generate_explanation_once(&attempt_req))
                            .await
                            .unwrap_or(Err(LlmError::Timeout(timeout)))
                    }
                },
                is_retryable,
            )
            .await
    }

    /// Generate a follow-up response, with the same retry envelope as
    /// [`Self::generate_questions`].
    ///
    /// # Errors
    ///
    /// Returns [`LlmError`] if every attempt fails.
    async fn generate_followup_response(&self, req: &FollowupRequest) -> Result<FollowupResponse> {
        let policy = self.policy();
        let base = req.clone();
        policy
            .retry(
                |attempt| {
                    let mut attempt_req = base.clone();
                    if attempt > 1 {
                        attempt_req.corrective_hint = attempt_req.corrective_hint.or_else(|| {
                            Some("response must be valid JSON matching the documented followup schema".to_string())
                        });
                    }
                    let timeout = policy.call_timeout;
                    async move {
                        tokio::time::timeout(timeout, self.generate_followup_response_once(&attempt_req))
                            .await
                            .unwrap_or(Err(LlmError::Timeout(timeout)))
                    }
                },
                is_retryable,
            )
            .await
    }
}
