//! The embedding provider capability contract (spec §4.1 / C1).

use async_trait::async_trait;

use crate::error::EmbeddingError;

/// Per-element outcome of a batch embedding call: a single failing element
/// does not fail the whole batch.
pub type BatchElement = std::result::Result<Vec<f32>, EmbeddingError>;

/// Maps text to fixed-dimension vectors, with opaque batching.
///
/// Implementations must be deterministic for a fixed input within a model
/// version, and must report their dimension rather than have it hardcoded
/// by callers. Transient failures (rate limits, timeouts) are retried
/// internally with exponential backoff up to a configured cap; permanent
/// failures (bad auth, malformed input) propagate immediately.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g. `"stub"`, `"text-embedding-004"`).
    fn name(&self) -> &str;

    /// Fixed output dimension `D` this provider produces.
    fn dimension(&self) -> usize;

    /// Embed a single text.
    ///
    /// # Errors
    ///
    /// Returns [`EmbeddingError::UpstreamUnavailable`] if retries are
    /// exhausted on a transient failure, or [`EmbeddingError::Permanent`]
    /// for a non-retryable failure.
    async fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, EmbeddingError> {
        let mut results = self.embed_batch(std::slice::from_ref(&text.to_string())).await;
        results
            .pop()
            .unwrap_or_else(|| Err(EmbeddingError::Permanent("empty batch result".into())))
    }

    /// Embed a batch of texts. The caller may pass any batch size; the
    /// provider is responsible for internally chunking to its own batch
    /// limit. The result list is parallel to `texts`; an individual
    /// element's failure is carried as `Err` rather than failing the call.
    async fn embed_batch(&self, texts: &[String]) -> Vec<BatchElement>;
}
