//! Explanation generation: per-question context retrieval, an LLM call,
//! and a deterministic templated fallback on failure (spec §4.9 / C9).

use financebuddy_context::{ContextRetriever, RetrievalOptions};
use financebuddy_core::Question;
use financebuddy_llm::{ContextSnippet, ExplanationRequest, LlmAdapter};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;

use crate::error::Result;

/// Minimum relevance score applied to per-question explanation context
/// (spec §4.9).
const MIN_RELEVANCE_SCORE: f32 = 0.5;

/// Number of context documents retrieved per question (spec §4.9).
const CONTEXT_LIMIT: usize = 5;

/// The result of generating an explanation for one question.
#[derive(Debug, Clone)]
pub struct ExplanationOutcome {
    /// The explanation text shown to the learner.
    pub explanation: String,
    /// Citation strings the explanation draws on.
    pub source_references: Vec<String>,
    /// True if the LLM call failed validation and the deterministic
    /// template fallback was used instead (spec §4.9: "observable in
    /// output metadata").
    pub fallback_used: bool,
}

/// Generates a grounded explanation for a single question lacking one.
pub struct ExplanationGenerator {
    retriever: Arc<ContextRetriever>,
    llm: Arc<dyn LlmAdapter>,
}

impl ExplanationGenerator {
    /// Construct a generator over an injected retriever and LLM adapter.
    #[must_use]
    pub fn new(retriever: Arc<ContextRetriever>, llm: Arc<dyn LlmAdapter>) -> Self {
        Self { retriever, llm }
    }

    /// Generate an explanation for `question` under `topic`, in the given
    /// `style`/`audience`, capped at `max_length` characters.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::GenerationError::Context`] if the
    /// per-question context retrieval itself fails. An invalid or
    /// rejected LLM response is not an error: this function falls back to
    /// a deterministic template (spec §4.9) and reports that in the
    /// returned [`ExplanationOutcome::fallback_used`].
    pub async fn generate(
        &self,
        topic: &str,
        question: &Question,
        style: &str,
        audience: &str,
        max_length: usize,
    ) -> Result<ExplanationOutcome> {
        let query = format!("{topic} {}", question.question_text);
        let opts = RetrievalOptions {
            limit: CONTEXT_LIMIT,
            min_score: MIN_RELEVANCE_SCORE,
            ..RetrievalOptions::default()
        };
        let context = self.retriever.retrieve_semantic(&query, &opts).await?;

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

        let Some(correct_answer_text) = question.options.get(&question.correct_answer) else {
            return Ok(self.fallback(question));
        };

        let req = ExplanationRequest {
            question_text: question.question_text.clone(),
            correct_answer_text: correct_answer_text.clone(),
            context: snippets,
            style: style.to_string(),
            audience: audience.to_string(),
            max_length,
            corrective_hint: None,
        };

        match self.llm.generate_explanation(&req).await {
            Ok(resp) if self.is_valid(&resp, &known_references, max_length) => Ok(ExplanationOutcome {
                explanation: resp.explanation,
                source_references: resp.source_references,
                fallback_used: false,
            }),
            Ok(resp) => {
                warn!(
                    question_id = %question.id,
                    len = resp.explanation.len(),
                    "generated explanation failed validation, falling back to template"
                );
                Ok(self.fallback(question))
            }
            Err(err) => {
                warn!(question_id = %question.id, error = %err, "explanation generation failed, falling back to template");
                Ok(self.fallback(question))
            }
        }
    }

    fn is_valid(
        &self,
        resp: &financebuddy_llm::ExplanationResponse,
        known_references: &HashSet<String>,
        max_length: usize,
    ) -> bool {
        !resp.explanation.trim().is_empty()
            && resp.explanation.len() <= max_length
            && resp.source_references.iter().all(|r| known_references.contains(r))
    }

    /// The deterministic fallback template from spec §4.9:
    /// `"The correct answer is {X}: {optionText}."`.
    fn fallback(&self, question: &Question) -> ExplanationOutcome {
        let option_text = question
            .options
            .get(&question.correct_answer)
            .cloned()
            .unwrap_or_default();
        ExplanationOutcome {
            explanation: format!("The correct answer is {}: {option_text}.", question.correct_answer),
            source_references: Vec::new(),
            fallback_used: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::{Difficulty, Document, DocumentId, DocumentType, OptionKey, QuestionId};
    use financebuddy_embeddings::StubEmbeddingProvider;
    use financebuddy_llm::StubLlmAdapter;
    use financebuddy_vectorstore::InMemoryVectorStore;
    use std::collections::BTreeMap;

    fn sample_question() -> Question {
        let mut options = BTreeMap::new();
        options.insert(OptionKey::A, "Call option".to_string());
        options.insert(OptionKey::B, "Put option".to_string());
        options.insert(OptionKey::C, "Straddle".to_string());
        options.insert(OptionKey::D, "Collar".to_string());
        Question {
            id: QuestionId::new(),
            topic: "Options Trading".to_string(),
            question_text: "Which contract conveys the right to buy?".to_string(),
            options,
            correct_answer: OptionKey::A,
            explanation: String::new(),
            source_references: Vec::new(),
            difficulty: Difficulty::Intermediate,
            created_at: chrono::Utc::now(),
        }
    }

    async fn seeded_retriever() -> Arc<ContextRetriever> {
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let store = Arc::new(InMemoryVectorStore::new("explain-test", 16));
        let content = "A call option conveys the right to buy the underlying.";
        let embedding = embedder.embed(content).await.unwrap();
        let doc = Document::new(DocumentId::from_source("textbook.md", 0), "Calls", content, DocumentType::Textbook, "textbook.md")
            .with_embedding(embedding);
        store.upsert(vec![doc]).await.unwrap();
        Arc::new(ContextRetriever::new(embedder, store, 0.7))
    }

    #[tokio::test]
    async fn stub_adapter_produces_a_validated_explanation() {
        let retriever = seeded_retriever().await;
        let llm = Arc::new(StubLlmAdapter);
        let generator = ExplanationGenerator::new(retriever, llm);

        let outcome = generator
            .generate("Options Trading", &sample_question(), "concise", "beginner", 500)
            .await
            .unwrap();
        assert!(!outcome.explanation.is_empty());
        assert!(!outcome.fallback_used);
    }

    #[tokio::test]
    async fn overlong_response_falls_back_to_deterministic_template() {
        let retriever = seeded_retriever().await;
        let llm = Arc::new(StubLlmAdapter);
        let generator = ExplanationGenerator::new(retriever, llm);

        let outcome = generator
            .generate("Options Trading", &sample_question(), "concise", "beginner", 1)
            .await
            .unwrap();
        assert!(outcome.fallback_used);
        assert!(outcome.explanation.starts_with("The correct answer is A"));
    }

    #[tokio::test]
    async fn empty_corpus_falls_back_rather_than_failing() {
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let store = Arc::new(InMemoryVectorStore::new("empty", 16));
        let retriever = Arc::new(ContextRetriever::new(embedder, store, 0.7));
        let llm = Arc::new(StubLlmAdapter);
        let generator = ExplanationGenerator::new(retriever, llm);

        let outcome = generator
            .generate("Options Trading", &sample_question(), "concise", "beginner", 500)
            .await
            .unwrap();
        assert!(!outcome.explanation.is_empty());
    }
}
