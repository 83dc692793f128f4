//! Document processing and ingestion pipeline (spec C3/C4).

pub mod chunking;
pub mod error;
pub mod lexicon;
pub mod pipeline;
pub mod processor;
pub mod registry;
pub mod report;

pub use chunking::{chunk_text, normalize_whitespace, ChunkConfig};
pub use error::{IngestError, Result, Severity};
pub use lexicon::{derive_keyword_tags, infer_document_type_markers, InferredType, DOMAIN_TERMS};
pub use pipeline::{IngestOptions, IngestionPipeline};
pub use processor::DocumentProcessor;
pub use registry::ProcessedFileRegistry;
pub use report::{DocumentError, IngestReport, ProcessReport};
