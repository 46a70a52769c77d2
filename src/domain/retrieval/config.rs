//! Retrieval tuning parameters

use serde::Deserialize;

use crate::domain::graph::EdgeType;

/// Edge types followed during query-time graph expansion
pub const EXPANSION_EDGE_TYPES: [EdgeType; 3] =
    [EdgeType::Defines, EdgeType::Overrides, EdgeType::RefersTo];

/// Tuning knobs for the hybrid retriever.
///
/// The three score weights fuse vector similarity with graph signals;
/// defaults give similarity 0.7 and split the remaining 0.3 between
/// centrality and path support.
#[derive(Debug, Clone, Deserialize)]
pub struct RetrievalConfig {
    /// Dense hits taken from the vector index
    pub dense_top_k: usize,
    /// Hop budget for graph expansion
    pub expansion_hops: usize,
    /// Maximum neighbors admitted to the candidate pool
    pub max_expansion: usize,
    /// Final evidence set size
    pub select_top_k: usize,
    /// Weight of dense cosine similarity
    pub similarity_weight: f32,
    /// Weight of normalized degree centrality
    pub centrality_weight: f32,
    /// Weight of normalized path support (edges to the seed set)
    pub path_support_weight: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            dense_top_k: 5,
            expansion_hops: 1,
            max_expansion: 20,
            select_top_k: 8,
            similarity_weight: 0.7,
            centrality_weight: 0.15,
            path_support_weight: 0.15,
        }
    }
}

impl RetrievalConfig {
    pub fn with_dense_top_k(mut self, dense_top_k: usize) -> Self {
        self.dense_top_k = dense_top_k;
        self
    }

    pub fn with_max_expansion(mut self, max_expansion: usize) -> Self {
        self.max_expansion = max_expansion;
        self
    }

    pub fn with_select_top_k(mut self, select_top_k: usize) -> Self {
        self.select_top_k = select_top_k;
        self
    }

    pub fn with_weights(mut self, similarity: f32, centrality: f32, path_support: f32) -> Self {
        self.similarity_weight = similarity;
        self.centrality_weight = centrality;
        self.path_support_weight = path_support;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = RetrievalConfig::default();
        let sum =
            config.similarity_weight + config.centrality_weight + config.path_support_weight;
        assert!((sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_builder_overrides() {
        let config = RetrievalConfig::default()
            .with_dense_top_k(3)
            .with_select_top_k(4);
        assert_eq!(config.dense_top_k, 3);
        assert_eq!(config.select_top_k, 4);
    }
}
