//! Hybrid retriever - dense search fused with clause-graph signals
//!
//! Single pass per query: dense top-k, optional k-hop expansion, combined
//! score reranking, role assignment, role-ordered context. No retries and
//! no fallbacks live here; an empty dense result stays empty.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::config::{RetrievalConfig, EXPANSION_EDGE_TYPES};
use super::result::{ClauseRole, Provenance, RetrievalResult, RetrievedClause};
use crate::domain::clause::ClauseId;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::error::DomainError;
use crate::domain::graph::{ClauseGraph, EdgeType};
use crate::domain::index::VectorIndex;

#[derive(Debug, Clone)]
struct Candidate {
    clause_id: ClauseId,
    similarity: f32,
    is_seed: bool,
    path_count: usize,
    centrality: f32,
}

/// Orchestrates dense search, graph expansion, scoring fusion and
/// role-structured selection over one immutable graph/index snapshot.
#[derive(Debug, Clone, Default)]
pub struct HybridRetriever {
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(config: RetrievalConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Run the retrieval pipeline for one query.
    ///
    /// Embeds the query, takes the dense top-k, optionally expands one
    /// graph neighborhood, fuses scores and returns the role-assigned
    /// evidence set. Zero dense hits yield an empty result, not an error.
    pub async fn retrieve(
        &self,
        query: &str,
        embedder: &dyn EmbeddingProvider,
        graph: &ClauseGraph,
        index: &VectorIndex,
        use_graph: bool,
    ) -> Result<RetrievalResult, DomainError> {
        let query_embedding = embedder.embed(query).await?;
        let dense_hits = index.search(&query_embedding, self.config.dense_top_k)?;

        if dense_hits.is_empty() {
            debug!("dense search returned zero hits");
            return Ok(RetrievalResult::empty());
        }

        let seed_ids: Vec<ClauseId> = dense_hits.iter().map(|(id, _)| id.clone()).collect();
        let seed_set: BTreeSet<ClauseId> = seed_ids.iter().cloned().collect();

        let mut pool: BTreeMap<ClauseId, Candidate> = dense_hits
            .iter()
            .map(|(id, similarity)| {
                (
                    id.clone(),
                    Candidate {
                        clause_id: id.clone(),
                        similarity: *similarity,
                        is_seed: true,
                        path_count: 0,
                        centrality: 0.0,
                    },
                )
            })
            .collect();

        if use_graph {
            let mut neighbors =
                graph.expand(&seed_ids, self.config.expansion_hops, &EXPANSION_EDGE_TYPES)?;
            // expand() orders by distance, then confidence, then ID, so
            // truncation keeps the closest, best-supported neighbors
            neighbors.truncate(self.config.max_expansion);

            for hit in neighbors {
                pool.entry(hit.clause_id.clone()).or_insert(Candidate {
                    clause_id: hit.clause_id,
                    similarity: 0.0,
                    is_seed: false,
                    path_count: 0,
                    centrality: 0.0,
                });
            }
        }

        for candidate in pool.values_mut() {
            candidate.centrality = graph.centrality(&candidate.clause_id);
            candidate.path_count = graph
                .connecting_edges(&candidate.clause_id, &seed_set)
                .len();
        }

        let max_path_count = pool.values().map(|c| c.path_count).max().unwrap_or(0);

        let mut items: Vec<RetrievedClause> = pool
            .values()
            .map(|candidate| {
                let path_support = if max_path_count > 0 {
                    candidate.path_count as f32 / max_path_count as f32
                } else {
                    0.0
                };
                let combined_score = self.config.similarity_weight * candidate.similarity
                    + self.config.centrality_weight * candidate.centrality
                    + self.config.path_support_weight * path_support;

                RetrievedClause {
                    clause_id: candidate.clause_id.clone(),
                    combined_score,
                    similarity: candidate.similarity,
                    role: ClauseRole::Supporting,
                    provenance: None,
                }
            })
            .collect();

        items.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.clause_id.cmp(&b.clause_id))
        });
        items.truncate(self.config.select_top_k);

        for item in &mut items {
            let is_seed = seed_set.contains(&item.clause_id);
            let connecting = graph.connecting_edges(&item.clause_id, &seed_set);
            item.role = Self::assign_role(&connecting_types(&connecting), is_seed);
            if !is_seed {
                item.provenance = connecting
                    .iter()
                    .max_by(|a, b| {
                        a.confidence()
                            .partial_cmp(&b.confidence())
                            .unwrap_or(std::cmp::Ordering::Equal)
                    })
                    .map(|edge| Provenance {
                        edge_type: edge.edge_type(),
                        confidence: edge.confidence(),
                    });
            }
        }

        debug!(
            seeds = seed_ids.len(),
            selected = items.len(),
            use_graph,
            "retrieval complete"
        );
        Ok(RetrievalResult::new(items))
    }

    /// Role precedence: Exception > Definition > BaseRule > Supporting
    fn assign_role(types: &BTreeSet<EdgeType>, is_seed: bool) -> ClauseRole {
        if types.contains(&EdgeType::Overrides) {
            ClauseRole::Exception
        } else if types.contains(&EdgeType::Defines) {
            ClauseRole::Definition
        } else if is_seed {
            ClauseRole::BaseRule
        } else {
            ClauseRole::Supporting
        }
    }
}

fn connecting_types(edges: &[&crate::domain::graph::Edge]) -> BTreeSet<EdgeType> {
    edges.iter().map(|e| e.edge_type()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::domain::clause::Clause;
    use crate::domain::graph::Edge;

    /// Embedder returning one fixed vector for every query
    #[derive(Debug)]
    struct FixedEmbedder(Vec<f32>);

    #[async_trait]
    impl EmbeddingProvider for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, DomainError> {
            Ok(self.0.clone())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, DomainError> {
            Ok(texts.iter().map(|_| self.0.clone()).collect())
        }

        fn provider_name(&self) -> &'static str {
            "fixed"
        }

        fn dimensions(&self) -> Option<usize> {
            Some(self.0.len())
        }
    }

    fn id(n: usize) -> ClauseId {
        ClauseId::sequential(n)
    }

    fn clause(n: usize, text: &str) -> Clause {
        Clause::new(id(n), text)
    }

    fn index_of(entries: &[(usize, Vec<f32>)]) -> VectorIndex {
        let mut index = VectorIndex::new();
        for (n, vector) in entries {
            index.add(id(*n), vector.clone()).unwrap();
        }
        index
    }

    #[tokio::test]
    async fn test_empty_index_yields_empty_result() {
        let graph = ClauseGraph::new(vec![clause(1, "a")], vec![]).unwrap();
        let index = VectorIndex::new();
        let retriever = HybridRetriever::default();

        let result = retriever
            .retrieve("anything", &FixedEmbedder(vec![1.0, 0.0]), &graph, &index, true)
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_grace_period_scenario() {
        // clause 1 defines the term clause 2 uses; clause 3 is unrelated
        // but has the same raw similarity as clause 1
        let clauses = vec![
            clause(1, "Grace period means 30 days"),
            clause(2, "Premium must be paid within the grace period"),
            clause(3, "Dental treatment is excluded"),
        ];
        let edges = vec![
            Edge::new(id(1), id(2), EdgeType::Defines, 0.9),
            Edge::new(id(1), id(2), EdgeType::SameSection, 1.0),
            Edge::new(id(2), id(1), EdgeType::SameSection, 1.0),
        ];
        let graph = ClauseGraph::new(clauses, edges).unwrap();
        let index = index_of(&[
            (1, vec![1.0, 0.0]),
            (2, vec![0.6, 0.8]),
            (3, vec![1.0, 0.0]),
        ]);

        let retriever = HybridRetriever::default();
        let result = retriever
            .retrieve(
                "What is the grace period?",
                &FixedEmbedder(vec![1.0, 0.0]),
                &graph,
                &index,
                true,
            )
            .await
            .unwrap();

        let items = result.items();
        assert_eq!(items[0].clause_id, id(1));
        assert_eq!(items[0].role, ClauseRole::Definition);

        let rank_1 = items.iter().position(|i| i.clause_id == id(1)).unwrap();
        let rank_3 = items.iter().position(|i| i.clause_id == id(3)).unwrap();
        assert!(rank_1 < rank_3);
    }

    #[tokio::test]
    async fn test_use_graph_false_skips_expansion() {
        let clauses = vec![
            clause(1, "base rule"),
            clause(2, "related rule"),
            clause(3, "cited annexure"),
        ];
        let edges = vec![Edge::new(id(1), id(3), EdgeType::RefersTo, 0.95)];
        let graph = ClauseGraph::new(clauses, edges).unwrap();
        // clause 3 is deliberately far from the query
        let index = index_of(&[
            (1, vec![1.0, 0.0]),
            (2, vec![0.9, 0.1]),
            (3, vec![0.0, 1.0]),
        ]);

        let retriever =
            HybridRetriever::new(RetrievalConfig::default().with_dense_top_k(2));
        let embedder = FixedEmbedder(vec![1.0, 0.0]);

        let without = retriever
            .retrieve("q", &embedder, &graph, &index, false)
            .await
            .unwrap();
        assert!(without.items().iter().all(|i| i.clause_id != id(3)));

        let with = retriever
            .retrieve("q", &embedder, &graph, &index, true)
            .await
            .unwrap();
        let pulled = with.items().iter().find(|i| i.clause_id == id(3)).unwrap();
        assert_eq!(pulled.similarity, 0.0);
        assert_eq!(
            pulled.provenance,
            Some(Provenance {
                edge_type: EdgeType::RefersTo,
                confidence: 0.95,
            })
        );
    }

    #[tokio::test]
    async fn test_expansion_cap_keeps_highest_confidence() {
        let clauses = vec![
            clause(1, "seed"),
            clause(2, "cited"),
            clause(3, "defined"),
        ];
        let edges = vec![
            Edge::new(id(1), id(2), EdgeType::RefersTo, 0.95),
            Edge::new(id(1), id(3), EdgeType::Defines, 0.9),
        ];
        let graph = ClauseGraph::new(clauses, edges).unwrap();
        let index = index_of(&[(1, vec![1.0, 0.0])]);

        let retriever = HybridRetriever::new(
            RetrievalConfig::default()
                .with_dense_top_k(1)
                .with_max_expansion(1),
        );
        let result = retriever
            .retrieve("q", &FixedEmbedder(vec![1.0, 0.0]), &graph, &index, true)
            .await
            .unwrap();

        let ids: Vec<&ClauseId> = result.items().iter().map(|i| &i.clause_id).collect();
        assert!(ids.contains(&&id(2)));
        assert!(!ids.contains(&&id(3)));
    }

    #[tokio::test]
    async fn test_role_precedence_exception_over_definition() {
        let clauses = vec![clause(1, "seed"), clause(2, "both relations")];
        let edges = vec![
            Edge::new(id(2), id(1), EdgeType::Defines, 0.9),
            Edge::new(id(2), id(1), EdgeType::Overrides, 0.7),
        ];
        let graph = ClauseGraph::new(clauses, edges).unwrap();
        let index = index_of(&[(1, vec![1.0, 0.0]), (2, vec![0.9, 0.1])]);

        let retriever = HybridRetriever::default();
        let result = retriever
            .retrieve("q", &FixedEmbedder(vec![1.0, 0.0]), &graph, &index, true)
            .await
            .unwrap();

        let item = result.items().iter().find(|i| i.clause_id == id(2)).unwrap();
        assert_eq!(item.role, ClauseRole::Exception);
    }

    #[tokio::test]
    async fn test_dense_only_seed_is_base_rule() {
        let clauses = vec![clause(1, "standalone rule"), clause(2, "other")];
        let graph = ClauseGraph::new(clauses, vec![]).unwrap();
        let index = index_of(&[(1, vec![1.0, 0.0]), (2, vec![0.0, 1.0])]);

        let retriever = HybridRetriever::default();
        let result = retriever
            .retrieve("q", &FixedEmbedder(vec![1.0, 0.0]), &graph, &index, true)
            .await
            .unwrap();

        assert_eq!(result.items()[0].clause_id, id(1));
        assert_eq!(result.items()[0].role, ClauseRole::BaseRule);
    }

    #[tokio::test]
    async fn test_path_support_is_monotone() {
        // clause 3's score must not decrease when another edge connects
        // it to the seed set (similarity and centrality weights pinned)
        let clauses = || {
            vec![
                clause(1, "seed one"),
                clause(2, "seed two"),
                clause(3, "neighbor"),
                clause(4, "anchor neighbor"),
            ]
        };
        let base_edges = vec![
            Edge::new(id(3), id(1), EdgeType::RefersTo, 0.95),
            Edge::new(id(4), id(1), EdgeType::RefersTo, 0.95),
            Edge::new(id(4), id(2), EdgeType::RefersTo, 0.95),
        ];
        let mut more_edges = base_edges.clone();
        more_edges.push(Edge::new(id(3), id(2), EdgeType::RefersTo, 0.95));

        let index = index_of(&[(1, vec![1.0, 0.0]), (2, vec![0.9, 0.1])]);
        let retriever = HybridRetriever::new(
            RetrievalConfig::default()
                .with_dense_top_k(2)
                .with_weights(0.7, 0.0, 0.3),
        );
        let embedder = FixedEmbedder(vec![1.0, 0.0]);

        let score_of = |result: &RetrievalResult| {
            result
                .items()
                .iter()
                .find(|i| i.clause_id == id(3))
                .map(|i| i.combined_score)
                .unwrap()
        };

        let graph_a = ClauseGraph::new(clauses(), base_edges).unwrap();
        let graph_b = ClauseGraph::new(clauses(), more_edges).unwrap();

        let a = retriever
            .retrieve("q", &embedder, &graph_a, &index, true)
            .await
            .unwrap();
        let b = retriever
            .retrieve("q", &embedder, &graph_b, &index, true)
            .await
            .unwrap();

        assert!(score_of(&b) >= score_of(&a));
    }

    #[tokio::test]
    async fn test_selection_truncates_with_ascending_id_ties() {
        let clauses: Vec<Clause> = (1..=10).map(|n| clause(n, "same text")).collect();
        let graph = ClauseGraph::new(clauses, vec![]).unwrap();

        let entries: Vec<(usize, Vec<f32>)> =
            (1..=10).map(|n| (n, vec![1.0, 0.0])).collect();
        let index = index_of(&entries);

        let retriever = HybridRetriever::new(
            RetrievalConfig::default()
                .with_dense_top_k(10)
                .with_select_top_k(8),
        );
        let result = retriever
            .retrieve("q", &FixedEmbedder(vec![1.0, 0.0]), &graph, &index, true)
            .await
            .unwrap();

        assert_eq!(result.len(), 8);
        let ids: Vec<&ClauseId> = result.items().iter().map(|i| &i.clause_id).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
