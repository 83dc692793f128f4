//! Ingestion pipeline: walks a directory, parses formats, feeds the
//! document processor (spec §4.4 / C4).

use financebuddy_core::RawDocument;
use std::path::Path;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::IngestError;
use crate::processor::DocumentProcessor;
use crate::registry::ProcessedFileRegistry;
use crate::report::IngestReport;

/// Options controlling a single ingestion run.
#[derive(Debug, Clone, Copy)]
pub struct IngestOptions {
    /// Skip files already recorded in the processed-file registry.
    pub skip_existing: bool,
    /// If true, a batch containing any invalid entry fails the whole file
    /// rather than skipping just the invalid entries.
    pub validate_before_processing: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            skip_existing: true,
            validate_before_processing: false,
        }
    }
}

/// Walks a directory recursively, parses `.txt`/`.md`/`.json` files into
/// raw documents, and feeds them to a [`DocumentProcessor`].
pub struct IngestionPipeline {
    registry: ProcessedFileRegistry,
}

impl Default for IngestionPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl IngestionPipeline {
    /// Construct a pipeline with a fresh, empty processed-file registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: ProcessedFileRegistry::new(),
        }
    }

    /// Walk `root` recursively, parse every `.txt`/`.md`/`.json` file into
    /// one or more raw documents, and run them through `processor`.
    ///
    /// # Errors
    ///
    /// Returns `Err` only for a whole-pipeline failure; malformed
    /// individual files are recorded in the returned report unless
    /// `validate_before_processing` is set and the file's batch contains
    /// any invalid entry, in which case that file is skipped entirely.
    pub async fn ingest_directory(
        &self,
        root: &Path,
        processor: &DocumentProcessor,
        opts: IngestOptions,
    ) -> Result<IngestReport, IngestError> {
        let mut report = IngestReport::default();
        let mut raw_docs = Vec::new();

        for entry in WalkDir::new(root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
        {
            let path = entry.path();
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !matches!(ext, "txt" | "md" | "json") {
                continue;
            }
            report.files_discovered += 1;

            match Self::parse_file(path, opts.validate_before_processing) {
                Ok(docs) => raw_docs.extend(docs),
                Err(message) => {
                    warn!(path = %path.display(), message, "skipping unparseable file");
                    report.files_skipped += 1;
                }
            }
        }

        report.process = processor
            .process_batch(raw_docs, Some(&self.registry), opts.skip_existing)
            .await?;

        info!(
            discovered = report.files_discovered,
            skipped = report.files_skipped,
            successes = report.process.successes,
            "ingestion run complete"
        );
        Ok(report)
    }

    fn parse_file(path: &Path, validate_before_processing: bool) -> Result<Vec<RawDocument>, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        let source = path.display().to_string();

        match ext {
            "json" => Self::parse_json(&content, &source, validate_before_processing),
            _ => {
                let title = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("untitled")
                    .to_string();
                Ok(vec![RawDocument {
                    title,
                    content,
                    source,
                    doc_type: None,
                    metadata: Default::default(),
                }])
            }
        }
    }

    fn parse_json(
        content: &str,
        source: &str,
        validate_before_processing: bool,
    ) -> Result<Vec<RawDocument>, String> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| format!("invalid JSON in {source}: {e}"))?;

        let entries: Vec<serde_json::Value> = match value {
            serde_json::Value::Array(items) => items,
            obj @ serde_json::Value::Object(_) => vec![obj],
            _ => return Err(format!("{source}: expected a JSON object or array")),
        };

        let mut docs = Vec::with_capacity(entries.len());
        let mut invalid = Vec::new();
        for (i, entry) in entries.into_iter().enumerate() {
            match Self::parse_json_entry(entry, source) {
                Ok(doc) => docs.push(doc),
                Err(message) => invalid.push(format!("entry {i}: {message}")),
            }
        }

        if !invalid.is_empty() {
            if validate_before_processing {
                return Err(format!("{source}: {}", invalid.join("; ")));
            }
            warn!(source, count = invalid.len(), "dropped invalid JSON entries");
        }

        Ok(docs)
    }

    fn parse_json_entry(entry: serde_json::Value, source: &str) -> Result<RawDocument, String> {
        let obj = entry
            .as_object()
            .ok_or_else(|| "entry is not a JSON object".to_string())?;

        let title = obj
            .get("title")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "missing required field 'title'".to_string())?
            .to_string();
        let content = obj
            .get("content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| "missing required field 'content'".to_string())?
            .to_string();
        let doc_source = obj
            .get("source")
            .and_then(|v| v.as_str())
            .map(ToString::to_string)
            .unwrap_or_else(|| source.to_string());
        let doc_type = obj
            .get("type")
            .and_then(|v| v.as_str())
            .and_then(|s| match s {
                "textbook" => Some(financebuddy_core::DocumentType::Textbook),
                "qa_pair" => Some(financebuddy_core::DocumentType::QaPair),
                "regulation" => Some(financebuddy_core::DocumentType::Regulation),
                _ => None,
            });
        let metadata = obj
            .get("metadata")
            .and_then(|v| v.as_object())
            .map(|m| m.clone().into_iter().collect())
            .unwrap_or_default();

        Ok(RawDocument {
            title,
            content,
            source: doc_source,
            doc_type,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::ChunkConfig;
    use financebuddy_embeddings::StubEmbeddingProvider;
    use financebuddy_vectorstore::InMemoryVectorStore;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        let mut f = std::fs::File::create(path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn ingests_textbook_qa_and_regulation_samples() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "chapter1.md", "Options are contracts that convey rights.");
        write_file(
            dir.path(),
            "practice_qa.json",
            r#"{"title": "Q1", "content": "Q: What is a put? A: A right to sell."}"#,
        );
        write_file(
            dir.path(),
            "reg.txt",
            "Section 12(a) shall require broker-dealers to register.",
        );

        let embedder = Arc::new(StubEmbeddingProvider::new(8));
        let store = Arc::new(InMemoryVectorStore::new("test", 8));
        let processor = DocumentProcessor::new(embedder, store.clone(), ChunkConfig::default(), 10);
        let pipeline = IngestionPipeline::new();

        let report = pipeline
            .ingest_directory(dir.path(), &processor, IngestOptions::default())
            .await
            .unwrap();

        assert_eq!(report.files_discovered, 3);
        assert_eq!(store.stats().await.unwrap().count, 3);
    }

    #[tokio::test]
    async fn json_array_of_documents_is_supported() {
        let dir = tempdir().unwrap();
        write_file(
            dir.path(),
            "bank.json",
            r#"[{"title":"Q1","content":"first"},{"title":"Q2","content":"second"}]"#,
        );

        let embedder = Arc::new(StubEmbeddingProvider::new(8));
        let store = Arc::new(InMemoryVectorStore::new("test", 8));
        let processor = DocumentProcessor::new(embedder, store.clone(), ChunkConfig::default(), 10);
        let pipeline = IngestionPipeline::new();

        let report = pipeline
            .ingest_directory(dir.path(), &processor, IngestOptions::default())
            .await
            .unwrap();

        assert_eq!(report.process.total_input_docs, 2);
    }

    #[tokio::test]
    async fn json_missing_required_field_is_dropped_not_fatal() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "bad.json", r#"{"title": "Only title"}"#);

        let embedder = Arc::new(StubEmbeddingProvider::new(8));
        let store = Arc::new(InMemoryVectorStore::new("test", 8));
        let processor = DocumentProcessor::new(embedder, store.clone(), ChunkConfig::default(), 10);
        let pipeline = IngestionPipeline::new();

        let report = pipeline
            .ingest_directory(dir.path(), &processor, IngestOptions::default())
            .await
            .unwrap();

        assert_eq!(report.process.total_input_docs, 0);
    }
}
