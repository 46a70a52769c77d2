//! Read-only index and graph statistics for status surfacing

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::clause::ClauseId;
use crate::domain::error::DomainError;
use crate::domain::graph::ClauseGraph;
use crate::domain::index::VectorIndex;

/// Aggregated statistics over one document's graph and vector index
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct IndexStatus {
    pub clause_count: usize,
    pub edge_count: usize,
    pub edges_by_type: BTreeMap<String, usize>,
    pub index_size: usize,
    pub dimension: Option<usize>,
    /// Whether graph and index agree on clause membership
    pub consistent: bool,
}

/// Computes [`IndexStatus`] snapshots. Holds no state and never mutates
/// the structures it inspects.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexStatusReporter;

impl IndexStatusReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report(&self, graph: &ClauseGraph, index: &VectorIndex) -> IndexStatus {
        let edges_by_type = graph
            .edge_counts_by_type()
            .into_iter()
            .map(|(edge_type, count)| (edge_type.as_str().to_string(), count))
            .collect();

        IndexStatus {
            clause_count: graph.clause_count(),
            edge_count: graph.edge_count(),
            edges_by_type,
            index_size: index.len(),
            dimension: index.dimension(),
            consistent: self.verify(graph, index).is_ok(),
        }
    }

    /// Checks that every indexed clause exists in the graph and vice
    /// versa. A mismatch after a completed build is a bug in the build
    /// pipeline and is reported rather than ignored.
    pub fn verify(&self, graph: &ClauseGraph, index: &VectorIndex) -> Result<(), DomainError> {
        let graph_ids = graph.clause_ids();
        let index_ids = index.clause_ids();

        let missing_in_index: Vec<&ClauseId> = graph_ids.difference(&index_ids).collect();
        let missing_in_graph: Vec<&ClauseId> = index_ids.difference(&graph_ids).collect();

        if missing_in_index.is_empty() && missing_in_graph.is_empty() {
            return Ok(());
        }

        Err(DomainError::referential_inconsistency(format!(
            "graph and index disagree on clause membership: {} clause(s) missing from index, {} missing from graph",
            missing_in_index.len(),
            missing_in_graph.len()
        )))
    }
}
