//! Question data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::CoreError;
use crate::ids::QuestionId;

/// The four fixed option keys a multiple-choice question exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
    A,
    B,
    C,
    D,
}

impl OptionKey {
    /// All keys, in presentation order.
    #[must_use]
    pub const fn all() -> [Self; 4] {
        [Self::A, Self::B, Self::C, Self::D]
    }

    /// Zero-based index matching the fixed A..D order (used by the quiz
    /// export schema's `correct: 0..3` field).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
            Self::C => 2,
            Self::D => 3,
        }
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for OptionKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "A" | "a" => Ok(Self::A),
            "B" | "b" => Ok(Self::B),
            "C" | "c" => Ok(Self::C),
            "D" | "d" => Ok(Self::D),
            other => Err(CoreError::InvalidId(format!("not an option key: {other}"))),
        }
    }
}

/// Difficulty tier for a generated question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A generated multiple-choice question.
///
/// Invariants (enforced by constructors in this module, not by serde):
/// all four option strings are non-empty and pairwise distinct;
/// `correct_answer` keys an existing option; `source_references` are
/// substrings of document titles or source ids seen during generation
/// (checked by the caller, which has that context — see
/// `financebuddy-generation`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier.
    pub id: QuestionId,
    /// Topic this question was generated for.
    pub topic: String,
    /// The question text itself.
    pub question_text: String,
    /// Exactly four options, keyed A..D.
    pub options: BTreeMap<OptionKey, String>,
    /// The correct option key.
    pub correct_answer: OptionKey,
    /// Explanation text; empty until the explanation generator runs.
    pub explanation: String,
    /// Citation strings referencing source documents.
    pub source_references: Vec<String>,
    /// Difficulty tier.
    pub difficulty: Difficulty,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reasons a candidate question fails validation (see `financebuddy-generation`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionValidationError {
    /// Fewer than four distinct, non-empty options were supplied.
    OptionsNotDistinct,
    /// `correct_answer` does not key an existing option.
    CorrectAnswerMissing,
    /// The explanation field was empty.
    EmptyExplanation,
    /// A source reference did not match any retrieved document id or title.
    UngroundedReference,
}

impl std::fmt::Display for QuestionValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OptionsNotDistinct => "options must be four non-empty, distinct strings",
            Self::CorrectAnswerMissing => "correct_answer does not key an existing option",
            Self::EmptyExplanation => "explanation must be non-empty",
            Self::UngroundedReference => "source reference does not match any retrieved document",
        };
        write!(f, "{s}")
    }
}

impl Question {
    /// Validate the structural invariants from spec §3 that do not require
    /// corpus context (distinctness of options, correct-answer presence,
    /// non-empty explanation). Source-reference grounding is checked
    /// separately by callers that have the retrieved-context set in hand.
    pub fn validate_structure(
        options: &BTreeMap<OptionKey, String>,
        correct_answer: OptionKey,
        explanation: &str,
    ) -> Result<(), QuestionValidationError> {
        if options.len() != 4 || options.values().any(|v| v.trim().is_empty()) {
            return Err(QuestionValidationError::OptionsNotDistinct);
        }
        let mut seen: Vec<&str> = Vec::with_capacity(4);
        for v in options.values() {
            if seen.contains(&v.as_str()) {
                return Err(QuestionValidationError::OptionsNotDistinct);
            }
            seen.push(v);
        }
        if !options.contains_key(&correct_answer) {
            return Err(QuestionValidationError::CorrectAnswerMissing);
        }
        if explanation.trim().is_empty() {
            return Err(QuestionValidationError::EmptyExplanation);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_options() -> BTreeMap<OptionKey, String> {
        [
            (OptionKey::A, "Call option".to_string()),
            (OptionKey::B, "Put option".to_string()),
            (OptionKey::C, "Straddle".to_string()),
            (OptionKey::D, "Collar".to_string()),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn option_key_index_matches_a_through_d_order() {
        assert_eq!(OptionKey::A.index(), 0);
        assert_eq!(OptionKey::D.index(), 3);
    }

    #[test]
    fn validate_structure_accepts_distinct_options() {
        assert!(Question::validate_structure(&sample_options(), OptionKey::B, "because").is_ok());
    }

    #[test]
    fn validate_structure_rejects_duplicate_option_text() {
        let mut opts = sample_options();
        opts.insert(OptionKey::D, "Call option".to_string());
        assert_eq!(
            Question::validate_structure(&opts, OptionKey::B, "because"),
            Err(QuestionValidationError::OptionsNotDistinct)
        );
    }
}
