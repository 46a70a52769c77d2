//! Edge extractor trait
//!
//! The graph builder composes a configurable ordered list of extractors;
//! each contributes candidate edges with its own confidence scores.

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::Edge;
use crate::domain::clause::Clause;
use crate::domain::error::DomainError;

/// A source of candidate edges over a clause set.
///
/// Pattern-based extractors run purely on lexical heuristics; semantic
/// extractors may call out to an LLM and pass its confidence through
/// unchanged.
#[async_trait]
pub trait EdgeExtractor: Send + Sync + Debug {
    /// Name for logging and diagnostics
    fn extractor_name(&self) -> &'static str;

    /// Produce candidate edges for the given clause set
    async fn extract(&self, clauses: &[Clause]) -> Result<Vec<Edge>, DomainError>;
}
