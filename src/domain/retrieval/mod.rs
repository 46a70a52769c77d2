//! Hybrid dense-plus-graph retrieval

mod config;
mod result;
mod retriever;

pub use config::{RetrievalConfig, EXPANSION_EDGE_TYPES};
pub use result::{ClauseRole, Provenance, RetrievalResult, RetrievedClause};
pub use retriever::HybridRetriever;
