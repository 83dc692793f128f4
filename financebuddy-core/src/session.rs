//! Session data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{QuestionId, SessionId};
use crate::question::{OptionKey, Question};

/// The step a session is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStep {
    Input,
    Questions,
    Answers,
    Explanations,
    Followup,
}

impl SessionStep {
    /// UI progress percentage for this step (spec §4.11).
    #[must_use]
    pub const fn progress(self) -> u8 {
        match self {
            Self::Input => 0,
            Self::Questions => 25,
            Self::Answers => 50,
            Self::Explanations => 75,
            Self::Followup => 100,
        }
    }
}

/// One follow-up question/answer turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowupExchange {
    /// The learner's follow-up question.
    pub user_question: String,
    /// The assistant's answer.
    pub assistant_answer: String,
    /// When this exchange occurred.
    pub timestamp: DateTime<Utc>,
}

/// A tutoring session: its topic, generated questions, learner answers,
/// and follow-up history.
///
/// Invariants: `questions.len() <= question_count` until generation
/// succeeds, then `==`; `user_answers` is only populated from the
/// `answers` step onward; step progression is monotonic except `restart`,
/// which yields a fresh session id while preserving topic/question_count;
/// any operation on an expired session (`now > expires_at`) must fail with
/// `NotFound` rather than succeeding silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier.
    pub id: SessionId,
    /// Optional authenticated user id (no-account mode leaves this `None`).
    pub user_id: Option<String>,
    /// Topic the learner selected.
    pub topic: String,
    /// Requested number of questions.
    pub question_count: usize,
    /// Generated questions, in presentation order.
    pub questions: Vec<Question>,
    /// Current step in the flow state machine.
    pub current_step: SessionStep,
    /// Learner's submitted answers, keyed by question id.
    pub user_answers: HashMap<QuestionId, OptionKey>,
    /// Follow-up exchanges, ordered by timestamp.
    pub followup_history: Vec<FollowupExchange>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Expiration timestamp; operations after this instant fail as `NotFound`.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Construct a fresh session at the `input` step with no questions yet.
    #[must_use]
    pub fn new(topic: impl Into<String>, question_count: usize, user_id: Option<String>, ttl_minutes: i64) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            user_id,
            topic: topic.into(),
            question_count,
            questions: Vec::new(),
            current_step: SessionStep::Input,
            user_answers: HashMap::new(),
            followup_history: Vec::new(),
            created_at: now,
            expires_at: now + chrono::Duration::minutes(ttl_minutes),
        }
    }

    /// Returns true if `now` is past this session's expiry.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Score the learner's answers against the generated questions' correct
    /// keys. Returns `(correct, total, percentage)`.
    #[must_use]
    pub fn score(&self) -> (usize, usize, u8) {
        let total = self.questions.len();
        if total == 0 {
            return (0, 0, 0);
        }
        let correct = self
            .questions
            .iter()
            .filter(|q| self.user_answers.get(&q.id) == Some(&q.correct_answer))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let percentage = ((correct as f64 / total as f64) * 100.0).round() as u8;
        (correct, total, percentage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_starts_at_input_step_with_no_questions() {
        let s = Session::new("Options Trading", 3, None, 60);
        assert_eq!(s.current_step, SessionStep::Input);
        assert!(s.questions.is_empty());
        assert_eq!(s.question_count, 3);
    }

    #[test]
    fn session_is_expired_only_after_its_expiry_instant() {
        let s = Session::new("Options Trading", 3, None, 60);
        assert!(!s.is_expired(s.created_at));
        assert!(s.is_expired(s.expires_at + chrono::Duration::seconds(1)));
    }

    #[test]
    fn score_with_no_questions_is_zero_of_zero() {
        let s = Session::new("Options Trading", 0, None, 60);
        assert_eq!(s.score(), (0, 0, 0));
    }
}
