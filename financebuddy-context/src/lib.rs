//! Context retrieval: basic/hybrid/balanced/enhanced retrieval modes plus
//! authority/recency/diversity reranking (spec §4.5 / C5).

mod authority;
mod bm25;
mod error;
mod reranker;
mod retriever;
mod types;

pub use error::{ContextError, Result};
pub use reranker::{rerank, Candidate, RerankConfig};
pub use retriever::ContextRetriever;
pub use types::{default_min_per_type, RetrievalOptions};
