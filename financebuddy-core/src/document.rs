//! Corpus document types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::DocumentId;

/// Closed enum of document types recognized by the corpus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Narrative/explanatory study material.
    Textbook,
    /// A question-and-answer pair, typically from a practice bank.
    QaPair,
    /// Regulatory text (rules, statutes, filings).
    Regulation,
}

impl DocumentType {
    /// All variants, in a stable order used for balanced retrieval defaults.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Textbook, Self::QaPair, Self::Regulation]
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Textbook => "textbook",
            Self::QaPair => "qa_pair",
            Self::Regulation => "regulation",
        };
        write!(f, "{s}")
    }
}

/// A single ingested, embedded, retrievable unit of the corpus.
///
/// Invariants: `id` is unique within a corpus; `embedding.len() == D` for
/// the corpus's configured dimension once stored (enforced by the vector
/// store on upsert, not by this type, since a freshly-chunked document has
/// no embedding yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable, content-addressed identifier.
    pub id: DocumentId,
    /// Human-readable title (filename stem for text/markdown sources).
    pub title: String,
    /// Plain-text content of this document or chunk.
    pub content: String,
    /// Closed-enum document type.
    pub doc_type: DocumentType,
    /// Originating file path or logical source identifier.
    pub source: String,
    /// Optional chapter label.
    pub chapter: Option<String>,
    /// Optional section label.
    pub section: Option<String>,
    /// Free-form tags (declared + derived).
    pub tags: Vec<String>,
    /// Embedding vector; `None` until the embedder has run.
    pub embedding: Option<Vec<f32>>,
    /// Arbitrary metadata (authority, verified, etc.).
    pub metadata: HashMap<String, serde_json::Value>,
    /// Last-updated timestamp, used for recency reranking. `None` when the
    /// source never declared one; the reranker treats that as neutral
    /// recency rather than erroring (spec §4.5 edge cases).
    pub last_updated: Option<DateTime<Utc>>,
}

impl Document {
    /// Construct a new document with no embedding yet.
    #[must_use]
    pub fn new(
        id: DocumentId,
        title: impl Into<String>,
        content: impl Into<String>,
        doc_type: DocumentType,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
            doc_type,
            source: source.into(),
            chapter: None,
            section: None,
            tags: Vec::new(),
            embedding: None,
            metadata: HashMap::new(),
            last_updated: Some(Utc::now()),
        }
    }

    /// Attach an embedding vector.
    #[must_use]
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Override the last-updated timestamp (or clear it to `None`).
    #[must_use]
    pub fn with_last_updated(mut self, last_updated: Option<DateTime<Utc>>) -> Self {
        self.last_updated = last_updated;
        self
    }

    /// Attach tags.
    #[must_use]
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Attach metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if the embedding has the expected dimension.
    #[must_use]
    pub fn has_embedding_dim(&self, expected: usize) -> bool {
        self.embedding.as_ref().is_some_and(|e| e.len() == expected)
    }
}

/// A raw, pre-chunking input document as the ingestion pipeline receives it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Document title (provided, or derived from filename stem).
    pub title: String,
    /// Full text content before chunking.
    pub content: String,
    /// Originating source path or logical identifier.
    pub source: String,
    /// Declared type, if the caller knows it in advance.
    pub doc_type: Option<DocumentType>,
    /// Declared metadata, merged with derived metadata during processing.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_round_trips_through_serde() {
        for t in DocumentType::all() {
            let json = serde_json::to_string(&t).unwrap();
            let back: DocumentType = serde_json::from_str(&json).unwrap();
            assert_eq!(t, back);
        }
    }

    #[test]
    fn fresh_document_has_no_embedding() {
        let doc = Document::new(
            DocumentId::from_source("a.md", 0),
            "A",
            "content",
            DocumentType::Textbook,
            "a.md",
        );
        assert!(doc.embedding.is_none());
        assert!(!doc.has_embedding_dim(768));
    }
}
