//! Clause graph model, builder and persistence contract

mod builder;
mod entity;
mod extractor;
mod patterns;
mod store;

pub use builder::{GraphBuilder, DEFAULT_MIN_CONFIDENCE};
pub use entity::{ClauseGraph, Edge, EdgeType, NeighborHit};
pub use extractor::EdgeExtractor;
pub use patterns::{citations, defined_terms, PatternExtractor};
pub use store::ClauseGraphStore;

#[cfg(test)]
pub use extractor::mock;
