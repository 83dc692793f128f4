//! Processing/ingestion reports (spec §4.3 "Reports", §4.4).

use crate::error::Severity;

/// A single per-document error encountered while processing.
#[derive(Debug, Clone)]
pub struct DocumentError {
    /// Source path or logical identifier of the offending document.
    pub source: String,
    /// Human-readable description.
    pub message: String,
    /// Whether this error stopped the whole run or just this document.
    pub severity: Severity,
}

/// Outcome of running the document processor over a batch of raw documents.
#[derive(Debug, Clone, Default)]
pub struct ProcessReport {
    /// Total raw input documents seen.
    pub total_input_docs: usize,
    /// Total chunks produced across all documents.
    pub chunks_produced: usize,
    /// Chunks successfully embedded and upserted.
    pub successes: usize,
    /// Per-document errors, keyed by severity.
    pub errors: Vec<DocumentError>,
}

impl ProcessReport {
    /// True if at least one `Error`-severity entry was recorded.
    #[must_use]
    pub fn has_fatal_errors(&self) -> bool {
        self.errors.iter().any(|e| e.severity == Severity::Error)
    }
}

/// Outcome of a full ingestion-pipeline run over a directory.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Files discovered while walking the input directory.
    pub files_discovered: usize,
    /// Files skipped because `skip_existing` matched the registry.
    pub files_skipped: usize,
    /// Aggregated document-processing report.
    pub process: ProcessReport,
}
