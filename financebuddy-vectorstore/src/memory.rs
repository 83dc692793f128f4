//! In-memory vector store, backed by a concurrent hash map.
//!
//! This is the default implementation used in tests and local development;
//! a persistent/driver-backed implementation is out of scope for this
//! crate (spec §1) and would implement the same [`VectorStore`] trait.

use async_trait::async_trait;
use dashmap::DashMap;
use financebuddy_core::{Document, DocumentId};
use tracing::{debug, info};

use crate::error::{Result, VectorStoreError};
use crate::traits::{cosine_similarity_unit, ScoredDocument, SearchOptions, StoreStats, VectorStore};

/// A simple, read-mostly-friendly in-memory vector store.
///
/// Concurrent reads and writes are safe (backed by [`DashMap`]); there is
/// no persistence across process restarts.
pub struct InMemoryVectorStore {
    name: String,
    dimension: usize,
    documents: DashMap<DocumentId, Document>,
}

impl InMemoryVectorStore {
    /// Create a new store for the given collection name and embedding dimension.
    #[must_use]
    pub fn new(name: impl Into<String>, dimension: usize) -> Self {
        Self {
            name: name.into(),
            dimension,
            documents: DashMap::new(),
        }
    }

    fn matches_filters(doc: &Document, opts: &SearchOptions) -> bool {
        if let Some(t) = opts.type_filter {
            if doc.doc_type != t {
                return false;
            }
        }
        if !opts
            .tag_filter
            .iter()
            .all(|tag| doc.tags.iter().any(|t| t == tag))
        {
            return false;
        }
        for (key, expected) in &opts.metadata_filter {
            match doc.metadata.get(key) {
                Some(actual) if actual == expected => {}
                _ => return false,
            }
        }
        true
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn initialize(&self) -> Result<()> {
        debug!(collection = %self.name, "initialized in-memory vector store");
        Ok(())
    }

    async fn upsert(&self, documents: Vec<Document>) -> Result<()> {
        for doc in documents {
            let embedding = doc
                .embedding
                .as_ref()
                .ok_or_else(|| VectorStoreError::MissingEmbedding {
                    id: doc.id.to_string(),
                })?;
            if embedding.len() != self.dimension {
                return Err(VectorStoreError::DimensionMismatch {
                    id: doc.id.to_string(),
                    expected: self.dimension,
                    actual: embedding.len(),
                });
            }
            self.documents.insert(doc.id.clone(), doc);
        }
        Ok(())
    }

    async fn search_similar(
        &self,
        query_embedding: &[f32],
        opts: &SearchOptions,
    ) -> Result<Vec<ScoredDocument>> {
        let mut scored: Vec<ScoredDocument> = self
            .documents
            .iter()
            .filter(|entry| Self::matches_filters(entry.value(), opts))
            .filter_map(|entry| {
                let doc = entry.value();
                let embedding = doc.embedding.as_ref()?;
                let score = cosine_similarity_unit(query_embedding, embedding);
                if score >= opts.min_score {
                    Some(ScoredDocument {
                        document: doc.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        if opts.limit > 0 {
            scored.truncate(opts.limit);
        }
        Ok(scored)
    }

    async fn get_by_id(&self, id: &DocumentId) -> Result<Option<Document>> {
        Ok(self.documents.get(id).map(|e| e.value().clone()))
    }

    async fn delete(&self, id: &DocumentId) -> Result<()> {
        self.documents.remove(id);
        Ok(())
    }

    async fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            count: self.documents.len(),
            name: self.name.clone(),
        })
    }

    async fn clear(&self) -> Result<()> {
        let count = self.documents.len();
        self.documents.clear();
        info!(collection = %self.name, count, "cleared vector store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use financebuddy_core::DocumentType;

    fn doc(id: &str, embedding: Vec<f32>, doc_type: DocumentType) -> Document {
        Document::new(DocumentId::from_raw(id), id, "content", doc_type, "src").with_embedding(embedding)
    }

    #[tokio::test]
    async fn upsert_then_get_round_trips() {
        let store = InMemoryVectorStore::new("test", 3);
        store
            .upsert(vec![doc("d1", vec![1.0, 0.0, 0.0], DocumentType::Textbook)])
            .await
            .unwrap();
        let fetched = store.get_by_id(&DocumentId::from_raw("d1")).await.unwrap();
        assert!(fetched.is_some());
    }

    #[tokio::test]
    async fn upsert_rejects_missing_embedding() {
        let store = InMemoryVectorStore::new("test", 3);
        let bare = Document::new(
            DocumentId::from_raw("no-embed"),
            "t",
            "c",
            DocumentType::Textbook,
            "src",
        );
        let err = store.upsert(vec![bare]).await.unwrap_err();
        assert!(matches!(err, VectorStoreError::MissingEmbedding { .. }));
    }

    #[tokio::test]
    async fn search_respects_limit_and_min_score() {
        let store = InMemoryVectorStore::new("test", 2);
        store
            .upsert(vec![
                doc("a", vec![1.0, 0.0], DocumentType::Textbook),
                doc("b", vec![0.0, 1.0], DocumentType::Textbook),
            ])
            .await
            .unwrap();
        let opts = SearchOptions {
            limit: 1,
            min_score: 0.0,
            ..SearchOptions::default()
        };
        let results = store.search_similar(&[1.0, 0.0], &opts).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.id, DocumentId::from_raw("a"));
    }

    #[tokio::test]
    async fn search_filters_by_type() {
        let store = InMemoryVectorStore::new("test", 2);
        store
            .upsert(vec![
                doc("a", vec![1.0, 0.0], DocumentType::Textbook),
                doc("b", vec![1.0, 0.0], DocumentType::Regulation),
            ])
            .await
            .unwrap();
        let opts = SearchOptions {
            limit: 10,
            min_score: 0.0,
            type_filter: Some(DocumentType::Regulation),
            ..SearchOptions::default()
        };
        let results = store.search_similar(&[1.0, 0.0], &opts).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].document.doc_type, DocumentType::Regulation);
    }

    #[tokio::test]
    async fn clear_empties_the_store() {
        let store = InMemoryVectorStore::new("test", 2);
        store
            .upsert(vec![doc("a", vec![1.0, 0.0], DocumentType::Textbook)])
            .await
            .unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.stats().await.unwrap().count, 0);
    }
}
