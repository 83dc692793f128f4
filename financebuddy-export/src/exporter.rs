//! Transforms an internal [`Session`]'s questions into the external quiz
//! schema (spec §4.13 / C13).

use financebuddy_core::{Question, Session};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::HashMap;
use tracing::info;

use crate::error::{ExportError, Result};
use crate::types::{ExportMetadata, ExportOptions, ExportedQuestion, ExportedQuiz};

/// Stateless transformer from a session's questions to [`ExportedQuiz`].
#[derive(Debug, Default)]
pub struct QuizExporter;

impl QuizExporter {
    /// Construct an exporter. Stateless; exists as a type for symmetry
    /// with the other injected capability contracts.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Export `session`'s questions under `opts`.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::EmptyExport`] if no questions remain after
    /// filtering, deduplication, and `max_questions` truncation.
    pub fn export(&self, session: &Session, opts: &ExportOptions) -> Result<ExportedQuiz> {
        let mut questions: Vec<Question> = session.questions.clone();

        if let Some(difficulty) = opts.difficulty_filter {
            questions.retain(|q| q.difficulty == difficulty);
        }

        if opts.deduplicate {
            let mut seen = std::collections::HashSet::new();
            questions.retain(|q| seen.insert(q.question_text.clone()));
        }

        let used_seed = if opts.randomize_order {
            let seed = opts.seed.unwrap_or_else(|| rand::thread_rng().gen());
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            questions.shuffle(&mut rng);
            Some(seed)
        } else {
            None
        };

        if let Some(max) = opts.max_questions {
            questions.truncate(max);
        }

        if questions.is_empty() {
            return Err(ExportError::EmptyExport);
        }

        let explanations = opts.include_explanations.then(|| {
            questions
                .iter()
                .enumerate()
                .map(|(i, q)| (i.to_string(), q.explanation.clone()))
                .collect::<HashMap<_, _>>()
        });

        let difficulty = questions[0].difficulty;
        let exported_questions = questions
            .iter()
            .map(|q| ExportedQuestion {
                question: q.question_text.clone(),
                answers: q.options.values().cloned().collect::<Vec<_>>().try_into().unwrap_or_default(),
                correct: q.correct_answer.index() as u8,
            })
            .collect();

        info!(count = questions.len(), topic = %session.topic, "exported quiz");

        Ok(ExportedQuiz {
            title: session.topic.clone(),
            questions: exported_questions,
            metadata: ExportMetadata {
                topic: session.topic.clone(),
                difficulty,
                source_system: "FinanceBuddy".to_string(),
                exported_at: chrono::Utc::now(),
                explanations,
                shuffle_seed: used_seed,
            },
        })
    }
}
