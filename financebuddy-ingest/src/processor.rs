//! Document processor: normalize, chunk, tag, embed, persist (spec §4.3 / C3).

use financebuddy_core::{Document, DocumentId, RawDocument};
use financebuddy_embeddings::EmbeddingProvider;
use financebuddy_vectorstore::VectorStore;
use std::sync::Arc;
use tracing::{info, warn};

use crate::chunking::{chunk_text, normalize_whitespace, ChunkConfig};
use crate::error::{IngestError, Severity};
use crate::lexicon::{derive_keyword_tags, infer_document_type_markers};
use crate::registry::ProcessedFileRegistry;
use crate::report::{DocumentError, ProcessReport};

/// Normalizes, chunks, tags, embeds, and upserts raw documents.
pub struct DocumentProcessor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunk_config: ChunkConfig,
    embedding_batch_size: usize,
}

impl DocumentProcessor {
    /// Construct a processor with the given embedding provider and vector
    /// store, both injected rather than constructed internally (spec §9
    /// design notes: polymorphism over storage and providers).
    #[must_use]
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStore>,
        chunk_config: ChunkConfig,
        embedding_batch_size: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            chunk_config,
            embedding_batch_size: embedding_batch_size.max(1),
        }
    }

    /// Process a batch of raw documents: normalize, chunk, tag, embed in
    /// batches, and upsert into the vector store. Per-document failures
    /// are recorded in the returned report rather than aborting the batch.
    ///
    /// # Errors
    ///
    /// Only returns `Err` for a whole-pipeline failure (never from a
    /// single bad document, which is instead recorded in the report).
    pub async fn process_batch(
        &self,
        raw_docs: Vec<RawDocument>,
        registry: Option<&ProcessedFileRegistry>,
        skip_existing: bool,
    ) -> Result<ProcessReport, IngestError> {
        let mut report = ProcessReport {
            total_input_docs: raw_docs.len(),
            ..ProcessReport::default()
        };

        let mut all_chunks: Vec<Document> = Vec::new();

        for raw in raw_docs {
            if skip_existing {
                if let Some(reg) = registry {
                    if reg.contains(&raw.source, &raw.content) {
                        continue;
                    }
                }
            }

            match self.chunk_and_tag(&raw) {
                Ok(chunks) => {
                    report.chunks_produced += chunks.len();
                    all_chunks.extend(chunks);
                    if let Some(reg) = registry {
                        reg.mark_processed(&raw.source, &raw.content);
                    }
                }
                Err(message) => {
                    report.errors.push(DocumentError {
                        source: raw.source.clone(),
                        message,
                        severity: Severity::Warning,
                    });
                }
            }
        }

        for batch in all_chunks.chunks(self.embedding_batch_size) {
            let texts: Vec<String> = batch.iter().map(|d| d.content.clone()).collect();
            let results = self.embedder.embed_batch(&texts).await;

            let mut embedded = Vec::with_capacity(batch.len());
            for (doc, result) in batch.iter().zip(results.into_iter()) {
                match result {
                    Ok(embedding) => embedded.push(doc.clone().with_embedding(embedding)),
                    Err(e) => {
                        report.errors.push(DocumentError {
                            source: doc.source.clone(),
                            message: e.to_string(),
                            severity: Severity::Error,
                        });
                    }
                }
            }

            if !embedded.is_empty() {
                let count = embedded.len();
                self.store.upsert(embedded).await?;
                report.successes += count;
            }
        }

        info!(
            input = report.total_input_docs,
            chunks = report.chunks_produced,
            successes = report.successes,
            errors = report.errors.len(),
            "document processing complete"
        );
        Ok(report)
    }

    /// Normalize whitespace, split into chunks, and derive tags for a
    /// single raw document, assigning deterministic chunk ids.
    fn chunk_and_tag(&self, raw: &RawDocument) -> Result<Vec<Document>, String> {
        let normalized = normalize_whitespace(&raw.content);
        if normalized.is_empty() {
            return Err("document content is empty after normalization".to_string());
        }

        let doc_type = raw
            .doc_type
            .unwrap_or_else(|| infer_document_type_markers(&raw.source, &normalized).into());

        let pieces = chunk_text(&normalized, &self.chunk_config);
        let mut chunks = Vec::with_capacity(pieces.len());

        for (index, piece) in pieces.into_iter().enumerate() {
            let id = DocumentId::from_source(&raw.source, index);
            let mut tags = derive_keyword_tags(&piece);
            tags.push(doc_type.to_string());
            if let Some(declared) = raw.metadata.get("tags").and_then(|v| v.as_array()) {
                for t in declared {
                    if let Some(s) = t.as_str() {
                        if !tags.iter().any(|existing| existing == s) {
                            tags.push(s.to_string());
                        }
                    }
                }
            }

            let doc = Document::new(id, raw.title.clone(), piece, doc_type, raw.source.clone())
                .with_tags(tags)
                .with_metadata(raw.metadata.clone());
            chunks.push(doc);
        }

        if chunks.is_empty() {
            warn!(source = %raw.source, "document produced no chunks");
        }
        Ok(chunks)
    }
}
