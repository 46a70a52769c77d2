//! Vector index - nearest-neighbor search over clause embeddings

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::clause::ClauseId;
use crate::domain::error::DomainError;

/// L2-normalize a vector in place. Zero vectors are left untouched so
/// they never match anything instead of dividing by zero.
fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}

/// Stores one embedding per clause and supports cosine-similarity search.
///
/// Embeddings are normalized on insert, so cosine similarity reduces to an
/// inner product at query time. One entry per clause; re-adding an ID
/// replaces its vector.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: BTreeMap<ClauseId, Vec<f32>>,
    dimension: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the embedding for a clause
    pub fn add(&mut self, clause_id: ClauseId, embedding: Vec<f32>) -> Result<(), DomainError> {
        if embedding.is_empty() {
            return Err(DomainError::validation("embedding cannot be empty"));
        }
        match self.dimension {
            None => self.dimension = Some(embedding.len()),
            Some(dim) if dim != embedding.len() => {
                return Err(DomainError::validation(format!(
                    "embedding dimension mismatch: index has {}, got {}",
                    dim,
                    embedding.len()
                )));
            }
            Some(_) => {}
        }

        let mut embedding = embedding;
        l2_normalize(&mut embedding);
        self.entries.insert(clause_id, embedding);
        Ok(())
    }

    /// Nearest-neighbor search by cosine similarity.
    ///
    /// Returns up to `top_k` `(clause_id, similarity)` pairs ordered by
    /// descending similarity, ties broken by ascending clause ID. Searching
    /// an empty index returns an empty sequence, not an error.
    pub fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<(ClauseId, f32)>, DomainError> {
        if top_k == 0 {
            return Err(DomainError::validation("top_k must be at least 1"));
        }
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }
        let dim = self.dimension.unwrap_or(0);
        if query_embedding.len() != dim {
            return Err(DomainError::validation(format!(
                "query embedding dimension mismatch: index has {}, got {}",
                dim,
                query_embedding.len()
            )));
        }

        let mut query = query_embedding.to_vec();
        l2_normalize(&mut query);

        let mut scored: Vec<(ClauseId, f32)> = self
            .entries
            .iter()
            .map(|(id, vector)| {
                let similarity = vector.iter().zip(&query).map(|(a, b)| a * b).sum::<f32>();
                (id.clone(), similarity)
            })
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(top_k);
        Ok(scored)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn contains(&self, id: &ClauseId) -> bool {
        self.entries.contains_key(id)
    }

    /// All indexed clause IDs
    pub fn clause_ids(&self) -> BTreeSet<ClauseId> {
        self.entries.keys().cloned().collect()
    }

    /// Iterate entries in clause-ID order (for persistence)
    pub fn entries(&self) -> impl Iterator<Item = (&ClauseId, &Vec<f32>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: usize) -> ClauseId {
        ClauseId::sequential(n)
    }

    #[test]
    fn test_search_empty_index_returns_empty() {
        let index = VectorIndex::new();
        let results = index.search(&[1.0, 0.0], 5).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_rejects_zero_top_k() {
        let index = VectorIndex::new();
        assert!(index.search(&[1.0], 0).is_err());
    }

    #[test]
    fn test_add_rejects_dimension_mismatch() {
        let mut index = VectorIndex::new();
        index.add(id(1), vec![1.0, 0.0]).unwrap();
        assert!(index.add(id(2), vec![1.0, 0.0, 0.0]).is_err());
    }

    #[test]
    fn test_readd_replaces_entry() {
        let mut index = VectorIndex::new();
        index.add(id(1), vec![1.0, 0.0]).unwrap();
        index.add(id(1), vec![0.0, 1.0]).unwrap();
        assert_eq!(index.len(), 1);

        let results = index.search(&[0.0, 1.0], 1).unwrap();
        assert!((results[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_orders_by_similarity() {
        let mut index = VectorIndex::new();
        index.add(id(1), vec![1.0, 0.0]).unwrap();
        index.add(id(2), vec![0.0, 1.0]).unwrap();
        index.add(id(3), vec![0.7, 0.7]).unwrap();

        let results = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results[0].0, id(1));
        assert_eq!(results[1].0, id(3));
        assert_eq!(results[2].0, id(2));
    }

    #[test]
    fn test_ties_break_by_ascending_id() {
        let mut index = VectorIndex::new();
        index.add(id(2), vec![1.0, 0.0]).unwrap();
        index.add(id(1), vec![1.0, 0.0]).unwrap();

        let results = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(results[0].0, id(1));
        assert_eq!(results[1].0, id(2));
    }

    #[test]
    fn test_similarity_is_cosine() {
        let mut index = VectorIndex::new();
        // un-normalized input must score identically to its normalized form
        index.add(id(1), vec![10.0, 0.0]).unwrap();

        let results = index.search(&[2.0, 0.0], 1).unwrap();
        assert!((results[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_top_k_truncates() {
        let mut index = VectorIndex::new();
        for n in 1..=10 {
            index.add(id(n), vec![n as f32, 1.0]).unwrap();
        }
        let results = index.search(&[1.0, 0.0], 3).unwrap();
        assert_eq!(results.len(), 3);
    }
}
