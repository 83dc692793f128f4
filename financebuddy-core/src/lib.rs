//! Shared data model and error taxonomy for the FinanceBuddy tutoring backend.
//!
//! This crate has no async dependencies and no I/O; it defines the types
//! every other FinanceBuddy crate exchanges: [`Document`], [`Question`],
//! [`Session`], [`RetrievedContext`], and the identifier newtypes that
//! thread through them.

pub mod context;
pub mod document;
pub mod error;
pub mod ids;
pub mod question;
pub mod session;

pub use context::RetrievedContext;
pub use document::{Document, DocumentType, RawDocument};
pub use error::{Classified, CoreError, ErrorKind};
pub use ids::{DocumentId, QuestionId, SessionId};
pub use question::{Difficulty, OptionKey, Question, QuestionValidationError};
pub use session::{FollowupExchange, Session, SessionStep};
