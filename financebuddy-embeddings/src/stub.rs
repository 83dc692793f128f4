//! Deterministic stub embedding provider used by tests and local development.
//!
//! Produces a fixed-dimension vector derived from a SHA-256 digest of the
//! input text, so the same text always maps to the same vector within a
//! process (and across processes, since there is no seed), satisfying the
//! determinism contract of [`EmbeddingProvider`] without calling out to a
//! real model.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::EmbeddingError;
use crate::traits::{BatchElement, EmbeddingProvider};

/// Deterministic, hash-based embedding provider.
#[derive(Debug, Clone)]
pub struct StubEmbeddingProvider {
    dimension: usize,
}

impl StubEmbeddingProvider {
    /// Construct a stub provider with the given output dimension.
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    /// Construct a stub provider with the spec's default dimension (768).
    #[must_use]
    pub const fn default_dimension() -> Self {
        Self::new(768)
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.dimension);
        let mut counter: u32 = 0;
        while out.len() < self.dimension {
            let mut hasher = Sha256::new();
            hasher.update(text.as_bytes());
            hasher.update(counter.to_le_bytes());
            let digest = hasher.finalize();
            for byte in digest {
                if out.len() == self.dimension {
                    break;
                }
                // Map a byte into roughly [-1.0, 1.0].
                let v = (f32::from(byte) / 127.5) - 1.0;
                out.push(v);
            }
            counter += 1;
        }
        out
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Vec<BatchElement> {
        texts.iter().map(|t| Ok(self.embed_one(t))).collect()
    }
}

/// A stub provider that always fails, for exercising `UpstreamUnavailable`
/// / `RetrievalDegraded` paths in tests.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for FailingEmbeddingProvider {
    fn name(&self) -> &str {
        "failing-stub"
    }

    fn dimension(&self) -> usize {
        768
    }

    async fn embed_batch(&self, texts: &[String]) -> Vec<BatchElement> {
        texts
            .iter()
            .map(|_| {
                Err(EmbeddingError::UpstreamUnavailable(
                    "stub provider configured to fail".into(),
                ))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stub_embedding_is_deterministic() {
        let provider = StubEmbeddingProvider::new(32);
        let a = provider.embed("options trading basics").await.unwrap();
        let b = provider.embed("options trading basics").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
    }

    #[tokio::test]
    async fn stub_embedding_differs_for_different_text() {
        let provider = StubEmbeddingProvider::new(32);
        let a = provider.embed("call option").await.unwrap();
        let b = provider.embed("put option").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let provider = StubEmbeddingProvider::new(16);
        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let results = provider.embed_batch(&texts).await;
        assert_eq!(results.len(), 3);
        for r in results {
            assert!(r.is_ok());
        }
    }

    #[tokio::test]
    async fn failing_provider_reports_per_element_errors_without_panicking() {
        let provider = FailingEmbeddingProvider;
        let texts = vec!["a".to_string(), "b".to_string()];
        let results = provider.embed_batch(&texts).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(std::result::Result::is_err));
    }
}
