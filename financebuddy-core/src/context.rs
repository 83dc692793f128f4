//! Retrieved-context result type shared by the retriever and its callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// The result of a single retrieval call: an ordered list of documents
/// paired with relevance scores.
///
/// Invariant: `documents.len() == scores.len()`. Scores are comparable
/// across calls only up to rank order, not absolute value — do not
/// average or threshold scores from two different retrieval calls against
/// each other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Documents in descending-relevance order.
    pub documents: Vec<Document>,
    /// Relevance scores in `[0, 1]`, parallel to `documents`, non-increasing.
    pub scores: Vec<f32>,
    /// Total candidate count before any `limit`/`minScore` filtering.
    pub total_results: usize,
    /// The query string that produced this context.
    pub query: String,
    /// When this retrieval completed.
    pub retrieved_at: DateTime<Utc>,
    /// Set when the vector store was unavailable and retrieval fell back
    /// to a degraded path (keyword-only, or empty with a warning).
    pub degraded: bool,
}

impl RetrievedContext {
    /// An empty context for a given query (e.g. empty corpus, or no
    /// candidates survived filtering). Not an error condition.
    #[must_use]
    pub fn empty(query: impl Into<String>) -> Self {
        Self {
            documents: Vec::new(),
            scores: Vec::new(),
            total_results: 0,
            query: query.into(),
            retrieved_at: Utc::now(),
            degraded: false,
        }
    }

    /// Mark this context as produced by a degraded retrieval path.
    #[must_use]
    pub fn with_degraded(mut self, degraded: bool) -> Self {
        self.degraded = degraded;
        self
    }

    /// Number of documents currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// True if no documents were retrieved.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_context_has_matching_lengths() {
        let ctx = RetrievedContext::empty("options basics");
        assert_eq!(ctx.documents.len(), ctx.scores.len());
        assert!(ctx.is_empty());
    }
}
