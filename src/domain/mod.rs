//! Domain layer - Core business logic and entities

pub mod clause;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod graph;
pub mod index;
pub mod ingestion;
pub mod retrieval;
pub mod status;

pub use clause::{Clause, ClauseId};
pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use generation::GenerationProvider;
pub use graph::{
    ClauseGraph, ClauseGraphStore, Edge, EdgeExtractor, EdgeType, GraphBuilder, NeighborHit,
    PatternExtractor,
};
pub use index::{VectorIndex, VectorIndexStore};
pub use ingestion::{ClauseSegmenter, DocumentFetcher, RawText};
pub use retrieval::{
    ClauseRole, HybridRetriever, Provenance, RetrievalConfig, RetrievalResult, RetrievedClause,
};
pub use status::{IndexStatus, IndexStatusReporter};
