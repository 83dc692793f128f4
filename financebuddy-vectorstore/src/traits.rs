//! The vector store capability contract (spec §4.2 / C2).

use async_trait::async_trait;
use financebuddy_core::{Document, DocumentId, DocumentType};
use std::collections::HashMap;

use crate::error::Result;

/// A document paired with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    /// The retrieved document.
    pub document: Document,
    /// Cosine similarity mapped into `[0, 1]`.
    pub score: f32,
}

/// Options narrowing a [`VectorStore::search_similar`] call.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum number of results to return.
    pub limit: usize,
    /// Minimum score a result must meet to be included.
    pub min_score: f32,
    /// Restrict results to this document type, if set.
    pub type_filter: Option<DocumentType>,
    /// Restrict results to documents carrying all of these tags.
    pub tag_filter: Vec<String>,
    /// Restrict results to documents whose metadata matches every entry here.
    pub metadata_filter: HashMap<String, serde_json::Value>,
}

impl SearchOptions {
    /// Construct options with just a limit, no other filters.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

/// Aggregate statistics about a collection.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of documents currently stored.
    pub count: usize,
    /// Collection name.
    pub name: String,
}

/// Stores documents + embeddings and answers k-NN / metadata-filtered
/// similarity queries.
///
/// `search_similar` returns at most `opts.limit` results with
/// `score >= opts.min_score`; all filters are conjunctive; score is cosine
/// similarity mapped into `[0, 1]`. A driver outage is surfaced as
/// [`crate::error::VectorStoreError::BackendUnavailable`]; callers (the
/// context retriever) treat that as degraded retrieval rather than a hard
/// failure, per spec §7.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Idempotently create the named collection.
    async fn initialize(&self) -> Result<()>;

    /// Atomically upsert documents. Each document must already carry an
    /// embedding of the collection's dimension.
    async fn upsert(&self, documents: Vec<Document>) -> Result<()>;

    /// Search for documents similar to `query_embedding`.
    async fn search_similar(
        &self,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>>;

    /// Fetch a single document by id.
    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>>;

    /// Delete a document by id. Not an error if the id does not exist.
    async fn delete(&self, id: &DocumentId) -> Result<()>;

    /// Aggregate statistics about the collection.
    async fn stats(&self) -> Result<StoreStats>;

    /// Remove all documents from the collection.
    async fn clear(&self) -> Result<()>;
}

/// Compute cosine similarity between two vectors, mapped into `[0, 1]`.
///
/// Raw cosine similarity is in `[-1, 1]`; this maps it linearly so callers
/// can treat the result as a probability-like relevance score.
#[must_use]
pub fn cosine_similarity_unit(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for i in 0..a.len().min(b.len()) {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let cosine = dot / (norm_a.sqrt() * norm_b.sqrt());
    (cosine + 1.0) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity_unit(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_score_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity_unit(&a, &b) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero_not_nan() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity_unit(&a, &b), 0.0);
    }
}
