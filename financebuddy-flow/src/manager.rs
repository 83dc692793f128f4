//! Orchestrates the full session lifecycle: drives [`crate::controller`]
//! through its steps, invoking question/explanation generation and
//! follow-up turns, and publishing view-state snapshots to subscribers
//! (spec §4.12 / C12).
//!
//! Concurrency: each session id gets its own `tokio::sync::Mutex`,
//! registered lazily in a `DashMap` (spec §5: "the flow manager holds a
//! per-session lock (mutex keyed by session id)"). A second concurrent
//! action on the same session fails fast with [`FlowError::Busy`] rather
//! than interleaving with the in-flight one.

use dashmap::DashMap;
use financebuddy_context::{ContextRetriever, RetrievalOptions};
use financebuddy_core::{Difficulty, OptionKey, Question, QuestionId, Session, SessionId, SessionStep};
use financebuddy_generation::{ExplanationGenerator, QuestionGenerator};
use financebuddy_llm::{ContextSnippet, FollowupRequest, LlmAdapter};
use financebuddy_sessions::SessionStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use crate::controller::{self, FlowAction};
use crate::error::{FlowError, Result};
use crate::view_state::ViewState;

/// A registered view-state callback.
type Subscriber = Arc<dyn Fn(&ViewState) + Send + Sync>;

/// A handle returned by [`FlowManager::subscribe`], needed to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(SessionId, u64);

/// Orchestrates the session flow state machine end to end (spec §4.12).
pub struct FlowManager {
    session_store: Arc<dyn SessionStore>,
    question_generator: Arc<QuestionGenerator>,
    explanation_generator: Arc<ExplanationGenerator>,
    retriever: Arc<ContextRetriever>,
    llm: Arc<dyn LlmAdapter>,
    locks: DashMap<SessionId, Arc<AsyncMutex<()>>>,
    subscribers: DashMap<SessionId, Vec<(u64, Subscriber)>>,
    next_sub_id: AtomicU64,
}

impl FlowManager {
    /// Construct a manager over injected capability contracts (spec §9
    /// design note: constructor injection, no global singletons).
    #[must_use]
    pub fn new(
        session_store: Arc<dyn SessionStore>,
        question_generator: Arc<QuestionGenerator>,
        explanation_generator: Arc<ExplanationGenerator>,
        retriever: Arc<ContextRetriever>,
        llm: Arc<dyn LlmAdapter>,
    ) -> Self {
        Self {
            session_store,
            question_generator,
            explanation_generator,
            retriever,
            llm,
            locks: DashMap::new(),
            subscribers: DashMap::new(),
            next_sub_id: AtomicU64::new(0),
        }
    }

    /// Register a subscriber; it receives every [`ViewState`] published
    /// for `session_id` from this point on, synchronously within the
    /// action's task (spec §5 ordering guarantee). The callback must not
    /// block (spec §9 design note).
    pub fn subscribe(&self, session_id: SessionId, callback: impl Fn(&ViewState) + Send + Sync + 'static) -> SubscriptionId {
        let sub_id = self.next_sub_id.fetch_add(1, Ordering::SeqCst);
        self.subscribers
            .entry(session_id)
            .or_default()
            .push((sub_id, Arc::new(callback)));
        SubscriptionId(session_id, sub_id)
    }

    /// Unsubscribe. No-op if the handle was already unsubscribed or its
    /// session was cleared.
    pub fn unsubscribe(&self, subscription: SubscriptionId) {
        if let Some(mut subs) = self.subscribers.get_mut(&subscription.0) {
            subs.retain(|(id, _)| *id != subscription.1);
        }
    }

    /// The current view state for a session, with no side effects.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Session`] if the session does not exist or
    /// has expired.
    pub async fn view_state(&self, session_id: SessionId) -> Result<ViewState> {
        let session = self.session_store.get(&session_id).await?;
        Ok(ViewState::for_session(session, false, None))
    }

    /// Create a session and immediately generate its first batch of
    /// questions, taking it from `input` to `questions` (spec S2).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Generation`] if question generation fails
    /// after its top-ups, or [`FlowError::Busy`]/[`FlowError::Session`]
    /// from the usual lock/store paths.
    pub async fn create_session(
        &self,
        topic: &str,
        question_count: usize,
        difficulty: Difficulty,
        user_id: Option<String>,
    ) -> Result<ViewState> {
        let session = self.session_store.create(topic, question_count, user_id).await?;
        self.run_generate_questions(session, topic, question_count, difficulty).await
    }

    async fn run_generate_questions(
        &self,
        session: Session,
        topic: &str,
        question_count: usize,
        difficulty: Difficulty,
    ) -> Result<ViewState> {
        let id = session.id;
        let _guard = self.lock_for(id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        self.check_transition(&session, FlowAction::GenerateQuestions)?;
        self.publish(id, &ViewState::for_session(session.clone(), true, None));

        match self.question_generator.generate(topic, question_count, difficulty).await {
            Ok((questions, stats, _context)) => {
                info!(session = %id, generated = stats.generated, "questions generated");
                let updated = self
                    .session_store
                    .update(
                        &id,
                        Box::new(move |s| {
                            s.questions = questions;
                            s.current_step = SessionStep::Questions;
                            Ok(())
                        }),
                    )
                    .await?;
                let view = ViewState::for_session(updated, false, None);
                self.publish(id, &view);
                Ok(view)
            }
            Err(err) => {
                let view = ViewState::for_session(session, false, Some(err.to_string()));
                self.publish(id, &view);
                Err(err.into())
            }
        }
    }

    /// Record the learner's answers and reveal correctness, taking the
    /// session from `questions` to `answers` (spec S3).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if the session is not at
    /// the `questions` step, or [`FlowError::Busy`]/[`FlowError::Session`].
    pub async fn reveal_answers(&self, session_id: SessionId, answers: HashMap<QuestionId, OptionKey>) -> Result<ViewState> {
        let _guard = self.lock_for(session_id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        let session = self.session_store.get(&session_id).await?;
        self.check_transition(&session, FlowAction::RevealAnswers)?;
        self.publish(session_id, &ViewState::for_session(session.clone(), true, None));

        let updated = self
            .session_store
            .update(
                &session_id,
                Box::new(move |s| {
                    s.user_answers = answers;
                    s.current_step = SessionStep::Answers;
                    Ok(())
                }),
            )
            .await?;
        let view = ViewState::for_session(updated, false, None);
        self.publish(session_id, &view);
        Ok(view)
    }

    /// Generate an explanation for every question, taking the session
    /// from `answers` to `explanations` (spec S4).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if the session is not at
    /// the `answers` step. Explanation generation itself only fails via
    /// an underlying context-retrieval error — a rejected LLM response
    /// falls back to a deterministic template rather than erroring (spec
    /// §4.9), so a question is never left without an explanation.
    pub async fn show_explanations(&self, session_id: SessionId) -> Result<ViewState> {
        let _guard = self.lock_for(session_id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        let session = self.session_store.get(&session_id).await?;
        self.check_transition(&session, FlowAction::ShowExplanations)?;
        self.publish(session_id, &ViewState::for_session(session.clone(), true, None));

        let mut questions = session.questions.clone();
        for question in &mut questions {
            match self
                .explanation_generator
                .generate(&session.topic, question, "concise", "intermediate", 800)
                .await
            {
                Ok(outcome) => {
                    question.explanation = outcome.explanation;
                    question.source_references = outcome.source_references;
                }
                Err(err) => {
                    let view = ViewState::for_session(session.clone(), false, Some(err.to_string()));
                    self.publish(session_id, &view);
                    return Err(err.into());
                }
            }
        }

        let updated = self
            .session_store
            .update(
                &session_id,
                Box::new(move |s| {
                    s.questions = questions;
                    s.current_step = SessionStep::Explanations;
                    Ok(())
                }),
            )
            .await?;
        let view = ViewState::for_session(updated, false, None);
        self.publish(session_id, &view);
        Ok(view)
    }

    /// Ask the first follow-up question, taking the session from
    /// `explanations` to `followup` (spec S5).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if the session is not at
    /// the `explanations` step, or a context/llm error if the follow-up
    /// call itself fails.
    pub async fn ask_followup(&self, session_id: SessionId, question: String) -> Result<ViewState> {
        self.followup_turn(session_id, FlowAction::AskFollowup, question).await
    }

    /// Ask a subsequent follow-up question, staying at `followup` (spec S5).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidTransition`] if the session is not at
    /// the `followup` step, or a context/llm error if the call fails.
    pub async fn continue_followup(&self, session_id: SessionId, question: String) -> Result<ViewState> {
        self.followup_turn(session_id, FlowAction::ContinueFollowup, question).await
    }

    async fn followup_turn(&self, session_id: SessionId, action: FlowAction, question_text: String) -> Result<ViewState> {
        let _guard = self.lock_for(session_id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        let session = self.session_store.get(&session_id).await?;
        self.check_transition(&session, action)?;
        self.publish(session_id, &ViewState::for_session(session.clone(), true, None));

        let query = format!("{} {question_text}", session.topic);
        let opts = RetrievalOptions {
            limit: 5,
            min_score: 0.5,
            ..RetrievalOptions::default()
        };
        let context = match self.retriever.retrieve_semantic(&query, &opts).await {
            Ok(context) => context,
            Err(err) => {
                let view = ViewState::for_session(session.clone(), false, Some(err.to_string()));
                self.publish(session_id, &view);
                return Err(err.into());
            }
        };
        let snippets: Vec<ContextSnippet> = context
            .documents
            .iter()
            .map(|d| ContextSnippet {
                source_label: d.id.to_string(),
                text: d.content.clone(),
            })
            .collect();

        let req = FollowupRequest {
            question: question_text.clone(),
            context: snippets,
            topic: session.topic.clone(),
            previous_exchanges: session.followup_history.clone(),
            corrective_hint: None,
        };
        let response = match self.llm.generate_followup_response(&req).await {
            Ok(response) => response,
            Err(err) => {
                let view = ViewState::for_session(session.clone(), false, Some(err.to_string()));
                self.publish(session_id, &view);
                return Err(err.into());
            }
        };

        let exchange = financebuddy_core::FollowupExchange {
            user_question: question_text,
            assistant_answer: response.answer,
            timestamp: chrono::Utc::now(),
        };
        let updated = self
            .session_store
            .update(
                &session_id,
                Box::new(move |s| {
                    s.followup_history.push(exchange);
                    s.current_step = SessionStep::Followup;
                    Ok(())
                }),
            )
            .await?;
        let view = ViewState::for_session(updated, false, None);
        self.publish(session_id, &view);
        Ok(view)
    }

    /// Restart: create a fresh session preserving topic/question count,
    /// discarding the old one, and generate its first batch of questions
    /// (spec §4.11: `any, restart, input (new session id)`).
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::create_session`].
    pub async fn restart(&self, session_id: SessionId, difficulty: Difficulty) -> Result<ViewState> {
        let guard = self.lock_for(session_id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        let old = self.session_store.get(&session_id).await?;
        self.check_transition(&old, FlowAction::Restart)?;

        let topic = old.topic.clone();
        let question_count = old.question_count;
        let user_id = old.user_id.clone();
        self.session_store.delete(&session_id).await?;
        self.locks.remove(&session_id);
        self.subscribers.remove(&session_id);
        drop(guard);

        let new_session = self.session_store.create(&topic, question_count, user_id).await?;
        self.run_generate_questions(new_session, &topic, question_count, difficulty).await
    }

    /// Clear: delete the session (spec §4.11: `any, clear, (deleted)`).
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::Session`] if the session does not exist.
    pub async fn clear(&self, session_id: SessionId) -> Result<ViewState> {
        let _guard = self.lock_for(session_id).try_lock_owned().map_err(|_| FlowError::Busy)?;
        let session = self.session_store.get(&session_id).await?;
        self.check_transition(&session, FlowAction::Clear)?;
        self.session_store.delete(&session_id).await?;

        let view = ViewState::cleared();
        self.publish(session_id, &view);
        self.locks.remove(&session_id);
        self.subscribers.remove(&session_id);
        Ok(view)
    }

    fn lock_for(&self, session_id: SessionId) -> Arc<AsyncMutex<()>> {
        Arc::clone(self.locks.entry(session_id).or_insert_with(|| Arc::new(AsyncMutex::new(()))).value())
    }

    /// Validate `action` against the session's current step; on failure,
    /// publish an error view state (without advancing the step) and
    /// return the error (spec §4.11: "the flow controller never advances
    /// on a failed downstream result").
    fn check_transition(&self, session: &Session, action: FlowAction) -> Result<()> {
        if let Err(err) = controller::apply(session.current_step, action) {
            self.publish(session.id, &ViewState::for_session(session.clone(), false, Some(err.to_string())));
            return Err(err);
        }
        Ok(())
    }

    fn publish(&self, session_id: SessionId, view: &ViewState) {
        if let Some(subs) = self.subscribers.get(&session_id) {
            for (_, callback) in subs.value() {
                callback(view);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_context::ContextRetriever;
    use financebuddy_core::{Document, DocumentId, DocumentType};
    use financebuddy_embeddings::StubEmbeddingProvider;
    use financebuddy_llm::StubLlmAdapter;
    use financebuddy_sessions::InMemorySessionStore;
    use financebuddy_vectorstore::InMemoryVectorStore;
    use std::sync::Mutex as StdMutex;

    async fn seeded_manager() -> FlowManager {
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let store = Arc::new(InMemoryVectorStore::new("flow-test", 16));
        for i in 0..6 {
            let content = format!("Options trading fact number {i}.");
            let embedding = embedder.embed(&content).await.unwrap();
            let doc = Document::new(
                DocumentId::from_source("textbook.md", i),
                format!("Fact {i}"),
                content,
                DocumentType::Textbook,
                "textbook.md",
            )
            .with_embedding(embedding);
            store.upsert(vec![doc]).await.unwrap();
        }
        let retriever = Arc::new(ContextRetriever::new(embedder, store, 0.7));
        let llm = Arc::new(StubLlmAdapter);
        let question_generator = Arc::new(QuestionGenerator::new(Arc::clone(&retriever), llm.clone(), false));
        let explanation_generator = Arc::new(ExplanationGenerator::new(Arc::clone(&retriever), llm.clone()));
        let session_store = Arc::new(InMemorySessionStore::new(60));

        FlowManager::new(session_store, question_generator, explanation_generator, retriever, llm)
    }

    #[tokio::test]
    async fn create_session_lands_on_questions_step_with_requested_count() {
        let manager = seeded_manager().await;
        let view = manager
            .create_session("Options Trading", 3, Difficulty::Intermediate, None)
            .await
            .unwrap();
        assert_eq!(view.current_step, SessionStep::Questions);
        assert_eq!(view.session.as_ref().unwrap().questions.len(), 3);
    }

    #[tokio::test]
    async fn full_lifecycle_reaches_followup_with_history() {
        let manager = seeded_manager().await;
        let created = manager
            .create_session("Options Trading", 3, Difficulty::Intermediate, None)
            .await
            .unwrap();
        let session_id = created.session.unwrap().id;

        let questions = manager.view_state(session_id).await.unwrap().session.unwrap().questions;
        let user_answers: HashMap<QuestionId, OptionKey> = questions.iter().map(|q| (q.id, q.correct_answer)).collect();

        let revealed = manager.reveal_answers(session_id, user_answers).await.unwrap();
        assert_eq!(revealed.current_step, SessionStep::Answers);

        let explained = manager.show_explanations(session_id).await.unwrap();
        assert_eq!(explained.current_step, SessionStep::Explanations);
        assert!(explained.session.as_ref().unwrap().questions.iter().all(|q| !q.explanation.is_empty()));

        let followed_up = manager.ask_followup(session_id, "What is a protective put?".to_string()).await.unwrap();
        assert_eq!(followed_up.current_step, SessionStep::Followup);
        assert_eq!(followed_up.session.as_ref().unwrap().followup_history.len(), 1);

        let again = manager
            .continue_followup(session_id, "How does that differ from a collar?".to_string())
            .await
            .unwrap();
        assert_eq!(again.session.as_ref().unwrap().followup_history.len(), 2);
    }

    #[tokio::test]
    async fn reveal_answers_before_questions_is_invalid_transition() {
        let manager = seeded_manager().await;
        let session = manager
            .session_store
            .create("Options Trading", 3, None)
            .await
            .unwrap();
        let err = manager.reveal_answers(session.id, HashMap::new()).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn restart_preserves_topic_and_count_under_a_new_id() {
        let manager = seeded_manager().await;
        let created = manager
            .create_session("Options Trading", 2, Difficulty::Beginner, None)
            .await
            .unwrap();
        let old_id = created.session.as_ref().unwrap().id;

        let restarted = manager.restart(old_id, Difficulty::Beginner).await.unwrap();
        let new_session = restarted.session.unwrap();
        assert_ne!(new_session.id, old_id);
        assert_eq!(new_session.topic, "Options Trading");
        assert_eq!(new_session.question_count, 2);
        assert!(manager.view_state(old_id).await.is_err());
    }

    #[tokio::test]
    async fn clear_deletes_the_session() {
        let manager = seeded_manager().await;
        let created = manager
            .create_session("Options Trading", 1, Difficulty::Beginner, None)
            .await
            .unwrap();
        let id = created.session.unwrap().id;
        manager.clear(id).await.unwrap();
        assert!(manager.view_state(id).await.is_err());
    }

    #[tokio::test]
    async fn subscribers_receive_published_view_states_in_order() {
        let manager = seeded_manager().await;
        let log: Arc<StdMutex<Vec<SessionStep>>> = Arc::new(StdMutex::new(Vec::new()));
        let created = manager
            .create_session("Options Trading", 1, Difficulty::Beginner, None)
            .await
            .unwrap();
        let id = created.session.unwrap().id;

        let log_clone = Arc::clone(&log);
        manager.subscribe(id, move |view| {
            log_clone.lock().unwrap().push(view.current_step);
        });

        let questions = manager.view_state(id).await.unwrap().session.unwrap().questions;
        let user_answers: HashMap<QuestionId, OptionKey> = questions.iter().map(|q| (q.id, q.correct_answer)).collect();
        manager.reveal_answers(id, user_answers).await.unwrap();

        let recorded = log.lock().unwrap().clone();
        assert_eq!(recorded, vec![SessionStep::Questions, SessionStep::Answers]);
    }
}
