//! Shared types for context retrieval and reranking.

use financebuddy_core::DocumentType;
use std::collections::HashMap;

/// Options narrowing any of the four retrieval modes (spec §4.5).
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Maximum number of results to return.
    pub limit: usize,
    /// Minimum relevance score a result must meet.
    pub min_score: f32,
    /// Restrict to a single document type, if set.
    pub type_filter: Option<DocumentType>,
    /// Restrict to documents carrying all of these tags.
    pub tag_filter: Vec<String>,
    /// Minimum results requested per type for balanced retrieval,
    /// defaulting per spec §4.5(c): 2 textbook, 1 qa_pair, 1 regulation.
    pub min_per_type: HashMap<DocumentType, usize>,
    /// Caller-provided type-preference weights for the reranker's `T` term.
    pub type_weights: HashMap<DocumentType, f32>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            min_score: 0.0,
            type_filter: None,
            tag_filter: Vec::new(),
            min_per_type: default_min_per_type(),
            type_weights: HashMap::new(),
        }
    }
}

impl RetrievalOptions {
    /// Construct options with just a limit, no other filters.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// Default minimum-per-type targets for balanced retrieval (spec §4.5(c)).
#[must_use]
pub fn default_min_per_type() -> HashMap<DocumentType, usize> {
    [
        (DocumentType::Textbook, 2),
        (DocumentType::QaPair, 1),
        (DocumentType::Regulation, 1),
    ]
    .into_iter()
    .collect()
}
