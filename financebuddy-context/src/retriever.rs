//! Context retriever: basic, hybrid, balanced, and enhanced retrieval modes
//! (spec §4.5 / C5), plus `findSimilar`/`retrieveByType`/`retrieveByTags`.

use financebuddy_core::{Document, DocumentId, DocumentType, RetrievedContext};
use financebuddy_embeddings::EmbeddingProvider;
use financebuddy_vectorstore::{SearchOptions, VectorStore};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bm25::keyword_score;
use crate::error::{ContextError, Result};
use crate::reranker::{rerank, Candidate, RerankConfig};
use crate::types::RetrievalOptions;

/// The context retrieval brain: embeds queries, calls the vector store,
/// blends vector/keyword scores, balances by type, and optionally reranks.
pub struct ContextRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    hybrid_alpha: f32,
}

impl ContextRetriever {
    /// Construct a retriever over an injected embedding provider and
    /// vector store.
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStore>, hybrid_alpha: f32) -> Self {
        Self {
            embedder,
            store,
            hybrid_alpha,
        }
    }

    fn to_search_opts(opts: &RetrievalOptions, limit: usize) -> SearchOptions {
        SearchOptions {
            limit,
            min_score: opts.min_score,
            type_filter: opts.type_filter,
            tag_filter: opts.tag_filter.clone(),
            metadata_filter: Default::default(),
        }
    }

    /// (a) Basic semantic retrieval: embed the query, ask the vector store
    /// for the nearest neighbors.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Embedding`] if the query cannot be embedded.
    /// A vector-store outage does not error here; it returns an empty,
    /// `degraded` context, matching spec §7's `RetrievalDegraded` policy.
    pub async fn retrieve_semantic(&self, query: &str, opts: &RetrievalOptions) -> Result<RetrievedContext> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(ContextError::Embedding)?;

        let search_opts = Self::to_search_opts(opts, opts.limit);
        match self.store.search_similar(&embedding, &search_opts).await {
            Ok(hits) => {
                let total = hits.len();
                let (documents, scores) = hits.into_iter().map(|h| (h.document, h.score)).unzip();
                Ok(RetrievedContext {
                    documents,
                    scores,
                    total_results: total,
                    query: query.to_string(),
                    retrieved_at: chrono::Utc::now(),
                    degraded: false,
                })
            }
            Err(e) => {
                warn!(error = %e, "vector store unavailable, returning degraded empty context");
                Ok(RetrievedContext::empty(query).with_degraded(true))
            }
        }
    }

    /// (b) Hybrid retrieval: blend vector similarity with a keyword score,
    /// `hybrid = alpha * vector + (1 - alpha) * keyword`. If the vector
    /// store is unavailable, falls back to keyword-only scoring over the
    /// same filtered pool obtained with a zero query vector... in
    /// practice the pool itself also comes from the store, so a true
    /// backend outage degrades to an empty, `degraded` context (there is
    /// no candidate pool to keyword-score against without a reachable
    /// store).
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Embedding`] if the query cannot be embedded.
    pub async fn retrieve_hybrid(&self, query: &str, opts: &RetrievalOptions) -> Result<RetrievedContext> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(ContextError::Embedding)?;

        // Broad, unfiltered-by-limit candidate pool stands in for the
        // union of top-N vector hits and top-N keyword hits from a
        // lexical index maintained alongside the store (SPEC_FULL.md §4).
        let pool_opts = SearchOptions {
            limit: 0,
            ..Self::to_search_opts(opts, 0)
        };

        let hits = match self.store.search_similar(&embedding, &pool_opts).await {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "vector store unavailable during hybrid retrieval");
                return Ok(RetrievedContext::empty(query).with_degraded(true));
            }
        };

        let alpha = self.hybrid_alpha;
        let mut scored: Vec<(Document, f32)> = hits
            .into_iter()
            .map(|h| {
                let k = keyword_score(query, &h.document);
                let blended = alpha * h.score + (1.0 - alpha) * k;
                (h.document, blended)
            })
            .filter(|(_, score)| *score >= opts.min_score)
            .collect();

        scored.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let total = scored.len();
        if opts.limit > 0 {
            scored.truncate(opts.limit);
        }

        let (documents, scores) = scored.into_iter().unzip();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: total,
            query: query.to_string(),
            retrieved_at: chrono::Utc::now(),
            degraded: false,
        })
    }

    /// (c) Balanced retrieval: guarantee at least `opts.min_per_type`
    /// results per declared document type by issuing parallel per-type
    /// retrievals and merging. Shortfalls are permitted — callers should
    /// inspect the returned context's length rather than treat a short
    /// result as an error.
    ///
    /// # Errors
    ///
    /// Returns [`ContextError::Embedding`] if the query cannot be embedded.
    pub async fn retrieve_balanced(&self, query: &str, opts: &RetrievalOptions) -> Result<RetrievedContext> {
        let embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(ContextError::Embedding)?;

        let mut merged: Vec<(Document, f32)> = Vec::new();
        let mut degraded = false;

        for doc_type in DocumentType::all() {
            let want = opts.min_per_type.get(&doc_type).copied().unwrap_or(0);
            if want == 0 {
                continue;
            }
            let per_type_opts = SearchOptions {
                limit: want,
                min_score: opts.min_score,
                type_filter: Some(doc_type),
                tag_filter: opts.tag_filter.clone(),
                metadata_filter: Default::default(),
            };
            match self.store.search_similar(&embedding, &per_type_opts).await {
                Ok(hits) => {
                    if hits.len() < want {
                        debug!(?doc_type, wanted = want, got = hits.len(), "balanced retrieval shortfall");
                    }
                    merged.extend(hits.into_iter().map(|h| (h.document, h.score)));
                }
                Err(e) => {
                    warn!(error = %e, ?doc_type, "vector store unavailable for this type during balanced retrieval");
                    degraded = true;
                }
            }
        }

        merged.sort_by(|(_, a), (_, b)| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        let total = merged.len();
        if opts.limit > 0 {
            merged.truncate(opts.limit);
        }

        let (documents, scores) = merged.into_iter().unzip();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: total,
            query: query.to_string(),
            retrieved_at: chrono::Utc::now(),
            degraded,
        })
    }

    /// (d) Enhanced retrieval: basic or hybrid retrieval followed by
    /// reranking with authority/recency/diversity/type-preference signals.
    ///
    /// # Errors
    ///
    /// Propagates errors from the underlying basic/hybrid retrieval call.
    pub async fn retrieve_enhanced(
        &self,
        query: &str,
        opts: &RetrievalOptions,
        use_hybrid: bool,
        rerank_config: &RerankConfig,
    ) -> Result<RetrievedContext> {
        // Pull an unbounded candidate pool so reranking has room to work
        // before the caller's limit is applied.
        let pool_opts = RetrievalOptions {
            limit: 0,
            ..opts.clone()
        };
        let base = if use_hybrid {
            self.retrieve_hybrid(query, &pool_opts).await?
        } else {
            self.retrieve_semantic(query, &pool_opts).await?
        };

        if base.is_empty() {
            return Ok(base);
        }

        let candidates: Vec<Candidate> = base
            .documents
            .iter()
            .zip(base.scores.iter())
            .map(|(d, s)| Candidate {
                document: d.clone(),
                base_score: *s,
            })
            .collect();

        let ranked = rerank(candidates, rerank_config, opts.limit);
        let (documents, scores) = ranked.into_iter().unzip();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: base.total_results,
            query: query.to_string(),
            retrieved_at: chrono::Utc::now(),
            degraded: base.degraded,
        })
    }

    /// Use `doc_id`'s own embedding as the query, excluding itself from
    /// the results.
    ///
    /// # Errors
    ///
    /// Returns the underlying vector-store error if the lookup itself
    /// fails (not degraded — this is a direct id lookup, not a search).
    pub async fn find_similar(&self, doc_id: &DocumentId, k: usize) -> Result<RetrievedContext> {
        let Some(source) = self.store.get_by_id(doc_id).await.map_err(ContextError::StoreUnavailable)? else {
            return Ok(RetrievedContext::empty(doc_id.to_string()));
        };
        let Some(embedding) = &source.embedding else {
            return Ok(RetrievedContext::empty(doc_id.to_string()));
        };

        let search_opts = SearchOptions::with_limit(k + 1);
        let hits = self
            .store
            .search_similar(embedding, &search_opts)
            .await
            .map_err(ContextError::StoreUnavailable)?;

        let mut documents = Vec::with_capacity(k);
        let mut scores = Vec::with_capacity(k);
        for hit in hits {
            if hit.document.id == *doc_id {
                continue;
            }
            documents.push(hit.document);
            scores.push(hit.score);
            if documents.len() >= k {
                break;
            }
        }
        let total = documents.len();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: total,
            query: format!("similar-to:{doc_id}"),
            retrieved_at: chrono::Utc::now(),
            degraded: false,
        })
    }

    /// Retrieve the top-`k` documents of a single declared type, with no
    /// query embedding involved (pure metadata filter + recency order for
    /// ties, since there is no relevance signal without a query).
    ///
    /// # Errors
    ///
    /// Returns the underlying vector-store error on a backend outage.
    pub async fn retrieve_by_type(&self, doc_type: DocumentType, k: usize) -> Result<RetrievedContext> {
        let opts = SearchOptions {
            limit: k,
            min_score: 0.0,
            type_filter: Some(doc_type),
            tag_filter: Vec::new(),
            metadata_filter: Default::default(),
        };
        // A zero vector has no directional information; with no query the
        // store's cosine-similarity ranking degenerates to an arbitrary
        // (but stable) order, which is acceptable since this call has no
        // query semantics to rank by in the first place.
        let hits = self
            .store
            .search_similar(&vec![0.0; 1], &opts)
            .await
            .map_err(ContextError::StoreUnavailable)?;
        let total = hits.len();
        let (documents, scores) = hits.into_iter().map(|h| (h.document, h.score)).unzip();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: total,
            query: format!("type:{doc_type}"),
            retrieved_at: chrono::Utc::now(),
            degraded: false,
        })
    }

    /// Retrieve the top-`k` documents carrying every tag in `tags`
    /// (conjunctive).
    ///
    /// # Errors
    ///
    /// Returns the underlying vector-store error on a backend outage.
    pub async fn retrieve_by_tags(&self, tags: &[String], k: usize) -> Result<RetrievedContext> {
        let opts = SearchOptions {
            limit: k,
            min_score: 0.0,
            type_filter: None,
            tag_filter: tags.to_vec(),
            metadata_filter: Default::default(),
        };
        let hits = self
            .store
            .search_similar(&vec![0.0; 1], &opts)
            .await
            .map_err(ContextError::StoreUnavailable)?;
        let total = hits.len();
        let (documents, scores) = hits.into_iter().map(|h| (h.document, h.score)).unzip();
        Ok(RetrievedContext {
            documents,
            scores,
            total_results: total,
            query: format!("tags:{}", tags.join(",")),
            retrieved_at: chrono::Utc::now(),
            degraded: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RetrievalOptions;
    use financebuddy_core::{Document, DocumentId, DocumentType};
    use financebuddy_embeddings::StubEmbeddingProvider;
    use financebuddy_vectorstore::InMemoryVectorStore;

    async fn seeded_store() -> Arc<InMemoryVectorStore> {
        let embedder = StubEmbeddingProvider::new(16);
        let store = Arc::new(InMemoryVectorStore::new("test", 16));
        let samples = [
            ("A call option conveys the right to buy.", DocumentType::Textbook, "textbook.md"),
            ("Q: What is a put? A: A right to sell.", DocumentType::QaPair, "qa.json"),
            ("Section 12 shall require broker registration.", DocumentType::Regulation, "reg.txt"),
        ];
        let mut docs = Vec::new();
        for (i, (content, doc_type, source)) in samples.into_iter().enumerate() {
            let embedding = embedder.embed(content).await.unwrap();
            docs.push(
                Document::new(DocumentId::from_source(source, 0), format!("doc-{i}"), content, doc_type, source)
                    .with_embedding(embedding),
            );
        }
        store.upsert(docs).await.unwrap();
        store
    }

    #[tokio::test]
    async fn basic_semantic_retrieval_returns_matching_lengths() {
        let store = seeded_store().await;
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let retriever = ContextRetriever::new(embedder, store, 0.7);

        let ctx = retriever
            .retrieve_semantic("option basics", &RetrievalOptions::with_limit(3))
            .await
            .unwrap();
        assert_eq!(ctx.documents.len(), ctx.scores.len());
        assert!(!ctx.degraded);
    }

    #[tokio::test]
    async fn balanced_retrieval_covers_each_type() {
        let store = seeded_store().await;
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let retriever = ContextRetriever::new(embedder, store, 0.7);

        let opts = RetrievalOptions {
            limit: 10,
            ..RetrievalOptions::default()
        };
        let ctx = retriever.retrieve_balanced("finance basics", &opts).await.unwrap();
        let has_type = |t: DocumentType| ctx.documents.iter().any(|d| d.doc_type == t);
        assert!(has_type(DocumentType::Textbook));
        assert!(has_type(DocumentType::QaPair));
        assert!(has_type(DocumentType::Regulation));
    }

    #[tokio::test]
    async fn enhanced_retrieval_reranks_without_crashing_on_empty_corpus() {
        let store = Arc::new(InMemoryVectorStore::new("empty", 16));
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let retriever = ContextRetriever::new(embedder, store, 0.7);

        let ctx = retriever
            .retrieve_enhanced(
                "anything",
                &RetrievalOptions::with_limit(5),
                true,
                &RerankConfig::default(),
            )
            .await
            .unwrap();
        assert!(ctx.is_empty());
    }

    #[tokio::test]
    async fn retrieve_by_type_filters_to_single_type() {
        let store = seeded_store().await;
        let embedder = Arc::new(StubEmbeddingProvider::new(16));
        let retriever = ContextRetriever::new(embedder, store, 0.7);

        let ctx = retriever.retrieve_by_type(DocumentType::Regulation, 10).await.unwrap();
        assert!(ctx.documents.iter().all(|d| d.doc_type == DocumentType::Regulation));
    }
}
