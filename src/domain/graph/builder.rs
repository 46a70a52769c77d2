//! Graph builder - composes edge extractors into one clause graph

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::entity::{ClauseGraph, Edge, EdgeType};
use super::extractor::EdgeExtractor;
use crate::domain::clause::{Clause, ClauseId};
use crate::domain::error::DomainError;

/// Default minimum confidence below which candidate edges are dropped
/// at build time, keeping the persisted graph lean.
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// Builds a [`ClauseGraph`] from segmented clauses.
///
/// Deterministic given identical input and extractor configuration: the
/// final edge set is the union of all extractor output after threshold
/// filtering, sorted by (source, target, type, confidence).
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    extractors: Vec<Arc<dyn EdgeExtractor>>,
    min_confidence: f32,
}

impl GraphBuilder {
    pub fn new(extractors: Vec<Arc<dyn EdgeExtractor>>) -> Self {
        Self {
            extractors,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence.clamp(0.0, 1.0);
        self
    }

    /// Build a graph snapshot from segmented clauses.
    ///
    /// Fails with an insufficient-input error when given zero clauses.
    /// Candidate edges that reference unknown clauses or carry an invalid
    /// self-loop are discarded with a warning rather than failing the
    /// build; extractors outside this crate cannot be trusted blindly.
    pub async fn build(&self, clauses: Vec<Clause>) -> Result<ClauseGraph, DomainError> {
        if clauses.is_empty() {
            return Err(DomainError::insufficient_input(
                "build invoked with zero clauses",
            ));
        }

        // term indexing pass: annotate each clause with the terms it defines
        let clauses: Vec<Clause> = clauses
            .into_iter()
            .map(|c| {
                let terms = super::patterns::defined_terms(c.text());
                c.with_terms(terms)
            })
            .collect();

        let known_ids: HashSet<ClauseId> = clauses.iter().map(|c| c.id().clone()).collect();
        let mut edges: Vec<Edge> = Vec::new();

        for extractor in &self.extractors {
            let candidates = extractor.extract(&clauses).await?;
            debug!(
                extractor = extractor.extractor_name(),
                candidates = candidates.len(),
                "extractor finished"
            );
            for edge in candidates {
                if edge.confidence() < self.min_confidence {
                    continue;
                }
                if !known_ids.contains(edge.source()) || !known_ids.contains(edge.target()) {
                    warn!(
                        extractor = extractor.extractor_name(),
                        source = %edge.source(),
                        target = %edge.target(),
                        "discarding edge with unknown endpoint"
                    );
                    continue;
                }
                if edge.is_self_loop() && edge.edge_type() != EdgeType::SameSection {
                    warn!(
                        extractor = extractor.extractor_name(),
                        clause = %edge.source(),
                        edge_type = %edge.edge_type(),
                        "discarding invalid self-loop"
                    );
                    continue;
                }
                edges.push(edge);
            }
        }

        edges.sort_by(|a, b| {
            a.source()
                .cmp(b.source())
                .then(a.target().cmp(b.target()))
                .then(a.edge_type().cmp(&b.edge_type()))
                .then(
                    a.confidence()
                        .partial_cmp(&b.confidence())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        edges.dedup();

        ClauseGraph::new(clauses, edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::extractor::mock::MockEdgeExtractor;

    fn clause(n: usize, text: &str) -> Clause {
        Clause::new(ClauseId::sequential(n), text).with_section("S1")
    }

    fn id(n: usize) -> ClauseId {
        ClauseId::sequential(n)
    }

    #[tokio::test]
    async fn test_build_fails_on_zero_clauses() {
        let builder = GraphBuilder::new(vec![]);
        let result = builder.build(vec![]).await;
        assert!(matches!(
            result,
            Err(DomainError::InsufficientInput { .. })
        ));
    }

    #[tokio::test]
    async fn test_threshold_filters_weak_edges() {
        let extractor = MockEdgeExtractor::new(vec![
            Edge::new(id(1), id(2), EdgeType::Overrides, 0.7),
            Edge::new(id(1), id(2), EdgeType::Entails, 0.3),
        ]);
        let builder = GraphBuilder::new(vec![Arc::new(extractor)]).with_min_confidence(0.5);

        let graph = builder
            .build(vec![clause(1, "a"), clause(2, "b")])
            .await
            .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].edge_type(), EdgeType::Overrides);
    }

    #[tokio::test]
    async fn test_invalid_candidates_are_discarded_not_fatal() {
        let extractor = MockEdgeExtractor::new(vec![
            Edge::new(id(1), id(9), EdgeType::RefersTo, 0.95),
            Edge::new(id(1), id(1), EdgeType::Overrides, 0.9),
            Edge::new(id(1), id(2), EdgeType::Defines, 0.9),
        ]);
        let builder = GraphBuilder::new(vec![Arc::new(extractor)]);

        let graph = builder
            .build(vec![clause(1, "a"), clause(2, "b")])
            .await
            .unwrap();

        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.edges()[0].edge_type(), EdgeType::Defines);
    }

    #[tokio::test]
    async fn test_union_of_extractors_is_deterministic() {
        let first = MockEdgeExtractor::new(vec![
            Edge::new(id(2), id(1), EdgeType::RefersTo, 0.95),
            Edge::new(id(1), id(2), EdgeType::Defines, 0.9),
        ]);
        let second = MockEdgeExtractor::new(vec![Edge::new(id(1), id(2), EdgeType::Entails, 0.8)]);
        let builder = GraphBuilder::new(vec![Arc::new(first), Arc::new(second)]);

        let graph_a = builder
            .build(vec![clause(1, "a"), clause(2, "b")])
            .await
            .unwrap();
        let graph_b = builder
            .build(vec![clause(1, "a"), clause(2, "b")])
            .await
            .unwrap();

        assert_eq!(graph_a.edges(), graph_b.edges());
        assert_eq!(graph_a.edge_count(), 3);
        // sorted by source first
        assert_eq!(graph_a.edges()[0].source(), &id(1));
        assert_eq!(graph_a.edges()[2].source(), &id(2));
    }

    #[tokio::test]
    async fn test_duplicate_candidates_are_collapsed() {
        let first = MockEdgeExtractor::new(vec![Edge::new(id(1), id(2), EdgeType::Defines, 0.9)]);
        let second = MockEdgeExtractor::new(vec![Edge::new(id(1), id(2), EdgeType::Defines, 0.9)]);
        let builder = GraphBuilder::new(vec![Arc::new(first), Arc::new(second)]);

        let graph = builder
            .build(vec![clause(1, "a"), clause(2, "b")])
            .await
            .unwrap();

        assert_eq!(graph.edge_count(), 1);
    }

    #[tokio::test]
    async fn test_extractor_failure_aborts_build() {
        let extractor = MockEdgeExtractor::with_error("semantic backend down");
        let builder = GraphBuilder::new(vec![Arc::new(extractor)]);

        let result = builder.build(vec![clause(1, "a")]).await;
        assert!(result.is_err());
    }
}
