//! Question generation: retrieve balanced context, call the LLM adapter,
//! validate candidates, top up shortfalls, assign stable ids (spec §4.8
//! / C8).

use financebuddy_context::{ContextRetriever, RerankConfig, RetrievalOptions};
use financebuddy_core::{Difficulty, Question, QuestionId, QuestionValidationError, RetrievedContext};
use financebuddy_llm::{ContextSnippet, LlmAdapter, QuestionGenRequest};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::{GenerationError, Result};

/// Default minimum relevance score applied to the context pulled before
/// question generation (spec §4.8 step 1).
pub const DEFAULT_MIN_RELEVANCE_SCORE: f32 = 0.6;

/// Maximum number of top-up re-requests after the initial generation
/// call (spec §4.8 step 4).
const MAX_TOPUPS: u32 = 2;

/// Statistics describing how a single `generate` call resolved.
#[derive(Debug, Clone, Copy)]
pub struct GenerationStats {
    pub requested: usize,
    pub generated: usize,
    pub dropped_invalid: usize,
    pub topup_attempts: u32,
}

/// Generates validated, grounded multiple-choice questions for a topic.
pub struct QuestionGenerator {
    retriever: Arc<ContextRetriever>,
    llm: Arc<dyn LlmAdapter>,
    allow_fallback_on_empty_context: bool,
}

impl QuestionGenerator {
    /// Construct a generator over an injected retriever and LLM adapter.
    #[must_use]
    pub fn new(retriever: Arc<ContextRetriever>, llm: Arc<dyn LlmAdapter>, allow_fallback_on_empty_context: bool) -> Self {
        Self {
            retriever,
            llm,
            allow_fallback_on_empty_context,
        }
    }

    /// Generate `count` questions on `topic` at the given difficulty.
    ///
    /// # Errors
    ///
    /// Returns [`GenerationError::InsufficientContext`] if retrieval
    /// returns no usable context and fallback generation is disabled;
    /// [`GenerationError::ShortfallAfterTopUps`] if, after the initial
    /// call and its top-ups, fewer than `count` valid questions survive
    /// validation; or a wrapped [`GenerationError::Context`] /
    /// [`GenerationError::Llm`] error from the underlying calls.
    pub async fn generate(
        &self,
        topic: &str,
        count: usize,
        difficulty: Difficulty,
    ) -> Result<(Vec<Question>, GenerationStats, RetrievedContext)> {
        let retrieval_opts = RetrievalOptions {
            limit: (count * 3).max(1),
            min_score: DEFAULT_MIN_RELEVANCE_SCORE,
            ..RetrievalOptions::default()
        };
        let context = self
            .retriever
            .retrieve_enhanced(topic, &retrieval_opts, true, &RerankConfig::default())
            .await?;

        if context.is_empty() && !self.allow_fallback_on_empty_context {
            return Err(GenerationError::InsufficientContext);
        }

        let snippets: Vec<ContextSnippet> = context
            .documents
            .iter()
            .map(|d| ContextSnippet {
                source_label: d.id.to_string(),
                text: d.content.clone(),
            })
            .collect();
        let known_references: HashSet<String> = context
            .documents
            .iter()
            .flat_map(|d| [d.id.to_string(), d.title.clone()])
            .collect();

        let mut accepted: Vec<Question> = Vec::with_capacity(count);
        let mut dropped_invalid = 0usize;
        let mut remaining = count;
        let mut topup_attempts = 0u32;

        loop {
            let req = QuestionGenRequest {
                topic: topic.to_string(),
                context: snippets.clone(),
                count: remaining,
                difficulty,
                corrective_hint: None,
            };
            let candidates = self.llm.generate_questions(&req).await?;

            for candidate in candidates {
                match validate_candidate(&candidate, &known_references) {
                    Ok(()) => {
                        accepted.push(Question {
                            id: QuestionId::new(),
                            topic: topic.to_string(),
                            question_text: candidate.question_text,
                            options: candidate.options,
                            correct_answer: candidate.correct_answer,
                            explanation: candidate.explanation,
                            source_references: candidate.source_references,
                            difficulty: candidate.difficulty,
                            created_at: chrono::Utc::now(),
                        });
                    }
                    Err(reason) => {
                        dropped_invalid += 1;
                        warn!(%reason, "dropped invalid generated question candidate");
                    }
                }
                if accepted.len() >= count {
                    break;
                }
            }

            remaining = count.saturating_sub(accepted.len());
            if remaining == 0 || topup_attempts >= MAX_TOPUPS {
                break;
            }
            topup_attempts += 1;
            info!(remaining, topup_attempts, "requesting top-up for shortfall");
        }

        accepted.truncate(count);
        let stats = GenerationStats {
            requested: count,
            generated: accepted.len(),
            dropped_invalid,
            topup_attempts,
        };

        if accepted.len() < count {
            return Err(GenerationError::ShortfallAfterTopUps {
                requested: count,
                produced: accepted.len(),
            });
        }

        Ok((accepted, stats, context))
    }
}

/// Validate a single generated candidate against spec §4.8 step 4:
/// distinct non-empty options, a valid correct key, a non-empty
/// explanation, and source references drawn from what was actually
/// retrieved.
fn validate_candidate(
    candidate: &financebuddy_llm::GeneratedQuestion,
    known_references: &HashSet<String>,
) -> std::result::Result<(), QuestionValidationError> {
    financebuddy_core::Question::validate_structure(
        &candidate.options,
        candidate.correct_answer,
        &candidate.explanation,
    )?;

    if !candidate
        .source_references
        .iter()
        .all(|r| known_references.contains(r))
    {
        return Err(QuestionValidationError::UngroundedReference);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::{Document, DocumentId, DocumentType};
    use financebuddy_embeddings::StubEmbeddingProvider;
    use financebuddy_llm::StubLlmAdapter;
    use financebuddy_vectorstore::InMemoryVectorStore;

    async fn seeded_retriever() -> Arc<ContextRetriever> {
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let store = Arc::new(InMemoryVectorStore::new("gen-test", 16));
        let mut docs = Vec::new();
        for i in 0..6 {
            let content = format!("Options trading concept number {i}.");
            let embedding = embedder.embed(&content).await.unwrap();
            docs.push(
                Document::new(
                    DocumentId::from_source("textbook.md", i),
                    format!("Concept {i}"),
                    content,
                    DocumentType::Textbook,
                    "textbook.md",
                )
                .with_embedding(embedding),
            );
        }
        store.upsert(docs).await.unwrap();
        Arc::new(ContextRetriever::new(embedder, store, 0.7))
    }

    #[tokio::test]
    async fn generates_requested_count_with_stub_adapter() {
        let retriever = seeded_retriever().await;
        let llm = Arc::new(StubLlmAdapter);
        let generator = QuestionGenerator::new(retriever, llm, false);

        let (questions, stats, context) = generator
            .generate("Options Trading", 3, Difficulty::Intermediate)
            .await
            .unwrap();
        assert_eq!(questions.len(), 3);
        assert_eq!(stats.generated, 3);
        assert!(!context.is_empty());
    }

    #[tokio::test]
    async fn empty_corpus_without_fallback_fails_insufficient_context() {
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let store = Arc::new(InMemoryVectorStore::new("empty", 16));
        let retriever = Arc::new(ContextRetriever::new(embedder, store, 0.7));
        let llm = Arc::new(StubLlmAdapter);
        let generator = QuestionGenerator::new(retriever, llm, false);

        let err = generator
            .generate("Nonexistent Topic", 2, Difficulty::Beginner)
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::InsufficientContext));
    }
}
