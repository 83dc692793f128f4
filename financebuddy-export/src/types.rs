//! The external quiz schema (spec §4.13, §6: "this is a stable external
//! contract"). Field names are `camelCase` on the wire since this schema
//! is consumed outside the Rust workspace.

use chrono::{DateTime, Utc};
use financebuddy_core::Difficulty;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single exported question: the prompt, its four answers in A..D
/// order, and the zero-based index of the correct one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedQuestion {
    pub question: String,
    /// Exactly four answer strings, in A..D order.
    pub answers: [String; 4],
    /// Zero-based index into `answers` of the correct choice, in `0..=3`.
    pub correct: u8,
}

/// Metadata describing how an export was produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub topic: String,
    pub difficulty: Difficulty,
    pub source_system: String,
    pub exported_at: DateTime<Utc>,
    /// Present only when `includeExplanations` was set; keyed by the
    /// exported question's index as a string (`"0"`, `"1"`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanations: Option<HashMap<String, String>>,
    /// The shuffle seed used when `randomizeOrder` was set, so a caller
    /// can reproduce the exact ordering (spec §4.13).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

/// The fixed external quiz schema a session's questions are transformed
/// into (spec §4.13, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportedQuiz {
    pub title: String,
    pub questions: Vec<ExportedQuestion>,
    pub metadata: ExportMetadata,
}

/// Options controlling a single export (spec §4.13).
#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Populate `metadata.explanations`.
    pub include_explanations: bool,
    /// Retain only questions at this difficulty, if set.
    pub difficulty_filter: Option<Difficulty>,
    /// Keep only the first N questions after filtering/deduplication/randomization.
    pub max_questions: Option<usize>,
    /// Shuffle the question order with a seeded RNG, reporting the seed
    /// used in `metadata.shuffleSeed` for reproducibility.
    pub randomize_order: bool,
    /// Explicit shuffle seed; if `randomize_order` is set and this is
    /// `None`, a random seed is generated and reported back.
    pub seed: Option<u64>,
    /// Drop exact duplicate `questionText`, keeping the first occurrence.
    pub deduplicate: bool,
}
