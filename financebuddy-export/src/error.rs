//! Error types for quiz export.

use financebuddy_core::error::{Classified, ErrorKind};
use thiserror::Error;

/// Result alias for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Errors raised while transforming a session's questions into the
/// external quiz schema (spec §4.13).
#[derive(Debug, Error)]
pub enum ExportError {
    /// No questions survived filtering/deduplication; an exported quiz
    /// must have at least one question (spec §4.13 invariant).
    #[error("export produced no questions after filtering")]
    EmptyExport,
}

impl Classified for ExportError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyExport => ErrorKind::Validation,
        }
    }
}
