//! Processed-file registry backing `skipExisting` (spec §4.4).
//!
//! Mutated only by the ingestion pipeline — single writer per run, per
//! spec §5 "Shared resources".

use dashmap::DashSet;
use sha2::{Digest, Sha256};

/// Tracks `(source, content-hash)` pairs already ingested, so re-running
/// ingestion over an unchanged directory is a no-op when `skip_existing`
/// is enabled.
#[derive(Debug, Default)]
pub struct ProcessedFileRegistry {
    seen: DashSet<(String, String)>,
}

impl ProcessedFileRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hash file content for registry keys.
    #[must_use]
    pub fn content_hash(content: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Returns true if this exact `(source, content)` pair has already
    /// been recorded as processed.
    #[must_use]
    pub fn contains(&self, source: &str, content: &str) -> bool {
        self.seen.contains(&(source.to_string(), Self::content_hash(content)))
    }

    /// Record a `(source, content)` pair as processed.
    pub fn mark_processed(&self, source: &str, content: &str) {
        self.seen.insert((source.to_string(), Self::content_hash(content)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmarked_source_is_not_seen() {
        let registry = ProcessedFileRegistry::new();
        assert!(!registry.contains("a.md", "hello"));
    }

    #[test]
    fn marked_source_with_same_content_is_seen() {
        let registry = ProcessedFileRegistry::new();
        registry.mark_processed("a.md", "hello");
        assert!(registry.contains("a.md", "hello"));
    }

    #[test]
    fn changed_content_is_not_considered_seen() {
        let registry = ProcessedFileRegistry::new();
        registry.mark_processed("a.md", "hello");
        assert!(!registry.contains("a.md", "hello world"));
    }
}
