//! Clause graph - typed directed multigraph over clauses
//!
//! Clauses and edges live in flat indexed containers within one immutable
//! snapshot. Rebuilds construct a new snapshot and swap it in; a graph
//! visible to in-flight queries is never mutated.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};

use crate::domain::clause::{Clause, ClauseId};
use crate::domain::error::DomainError;

/// Relation types between clauses
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EdgeType {
    Defines,
    RefersTo,
    Entails,
    Overrides,
    SameSection,
}

impl EdgeType {
    pub const ALL: [EdgeType; 5] = [
        EdgeType::Defines,
        EdgeType::RefersTo,
        EdgeType::Entails,
        EdgeType::Overrides,
        EdgeType::SameSection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Defines => "Defines",
            Self::RefersTo => "RefersTo",
            Self::Entails => "Entails",
            Self::Overrides => "Overrides",
            Self::SameSection => "SameSection",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A directed, typed relation between two clauses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    source: ClauseId,
    target: ClauseId,
    #[serde(rename = "type")]
    edge_type: EdgeType,
    confidence: f32,
}

impl Edge {
    /// Create a new edge. Confidence is clamped to [0, 1].
    pub fn new(source: ClauseId, target: ClauseId, edge_type: EdgeType, confidence: f32) -> Self {
        Self {
            source,
            target,
            edge_type,
            confidence: confidence.clamp(0.0, 1.0),
        }
    }

    pub fn source(&self) -> &ClauseId {
        &self.source
    }

    pub fn target(&self) -> &ClauseId {
        &self.target
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// A neighbor reached during graph expansion
#[derive(Debug, Clone, PartialEq)]
pub struct NeighborHit {
    pub clause_id: ClauseId,
    /// BFS distance from the closest seed
    pub distance: usize,
    /// Highest confidence among the edges that reached this neighbor
    pub best_confidence: f32,
}

/// Immutable snapshot of the full clause graph for one document build
#[derive(Debug, Clone)]
pub struct ClauseGraph {
    clauses: Vec<Clause>,
    edges: Vec<Edge>,
    id_index: HashMap<ClauseId, usize>,
    /// Per node: (neighbor node index, edge index), both edge orientations.
    /// Traversal treats edges as bidirectional; edge direction is kept for
    /// typing and role assignment.
    adjacency: Vec<Vec<(usize, usize)>>,
    max_degree: usize,
}

impl ClauseGraph {
    /// Assemble a graph snapshot from clauses and edges.
    ///
    /// Validates that every edge endpoint references a clause in this build
    /// and that self-loops only carry the `SameSection` type.
    pub fn new(clauses: Vec<Clause>, edges: Vec<Edge>) -> Result<Self, DomainError> {
        if clauses.is_empty() {
            return Err(DomainError::insufficient_input(
                "cannot build a clause graph from zero clauses",
            ));
        }

        let mut id_index = HashMap::with_capacity(clauses.len());
        for (idx, clause) in clauses.iter().enumerate() {
            if id_index.insert(clause.id().clone(), idx).is_some() {
                return Err(DomainError::validation(format!(
                    "duplicate clause ID '{}' in graph build",
                    clause.id()
                )));
            }
        }

        for edge in &edges {
            if !id_index.contains_key(edge.source()) {
                return Err(DomainError::validation(format!(
                    "edge source '{}' does not reference a clause in this build",
                    edge.source()
                )));
            }
            if !id_index.contains_key(edge.target()) {
                return Err(DomainError::validation(format!(
                    "edge target '{}' does not reference a clause in this build",
                    edge.target()
                )));
            }
            if edge.is_self_loop() && edge.edge_type() != EdgeType::SameSection {
                return Err(DomainError::validation(format!(
                    "self-loop with type {} on clause '{}' is not permitted",
                    edge.edge_type(),
                    edge.source()
                )));
            }
        }

        let mut adjacency: Vec<Vec<(usize, usize)>> = vec![Vec::new(); clauses.len()];
        let mut degrees = vec![0usize; clauses.len()];

        for (edge_idx, edge) in edges.iter().enumerate() {
            let src = id_index[edge.source()];
            let dst = id_index[edge.target()];
            adjacency[src].push((dst, edge_idx));
            degrees[src] += 1;
            degrees[dst] += 1;
            if src != dst {
                adjacency[dst].push((src, edge_idx));
            }
        }

        let max_degree = degrees.iter().copied().max().unwrap_or(0);

        Ok(Self {
            clauses,
            edges,
            id_index,
            adjacency,
            max_degree,
        })
    }

    pub fn clause_count(&self) -> usize {
        self.clauses.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn contains(&self, id: &ClauseId) -> bool {
        self.id_index.contains_key(id)
    }

    pub fn clause(&self, id: &ClauseId) -> Option<&Clause> {
        self.id_index.get(id).map(|&idx| &self.clauses[idx])
    }

    /// All clause IDs in this build
    pub fn clause_ids(&self) -> BTreeSet<ClauseId> {
        self.clauses.iter().map(|c| c.id().clone()).collect()
    }

    /// Edge counts broken down by relation type
    pub fn edge_counts_by_type(&self) -> BTreeMap<EdgeType, usize> {
        let mut counts = BTreeMap::new();
        for edge in &self.edges {
            *counts.entry(edge.edge_type()).or_insert(0) += 1;
        }
        counts
    }

    /// Normalized in-degree + out-degree of a clause within this graph,
    /// in [0, 1]. Static per snapshot.
    pub fn centrality(&self, id: &ClauseId) -> f32 {
        if self.max_degree == 0 {
            return 0.0;
        }
        let Some(&idx) = self.id_index.get(id) else {
            return 0.0;
        };
        let touches = self
            .edges
            .iter()
            .map(|e| {
                let mut t = 0usize;
                if self.id_index[e.source()] == idx {
                    t += 1;
                }
                if self.id_index[e.target()] == idx {
                    t += 1;
                }
                t
            })
            .sum::<usize>();
        touches as f32 / self.max_degree as f32
    }

    /// Breadth-first expansion from a seed set.
    ///
    /// Traverses up to `hops` levels from every seed simultaneously,
    /// following only edges whose type is in `types` (either orientation),
    /// and returns the reached neighbors excluding the seeds themselves.
    /// Terminates on cyclic graphs via a visited set; a node is recorded at
    /// its shallowest reachable depth.
    pub fn expand(
        &self,
        seeds: &[ClauseId],
        hops: usize,
        types: &[EdgeType],
    ) -> Result<Vec<NeighborHit>, DomainError> {
        if hops == 0 {
            return Err(DomainError::validation("hops must be at least 1"));
        }

        let mut visited: BTreeSet<usize> = BTreeSet::new();
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();

        for seed in seeds {
            if let Some(&idx) = self.id_index.get(seed) {
                if visited.insert(idx) {
                    queue.push_back((idx, 0));
                }
            }
        }

        let mut hits: HashMap<usize, NeighborHit> = HashMap::new();
        let seed_indices: BTreeSet<usize> = visited.clone();

        while let Some((node, depth)) = queue.pop_front() {
            if depth == hops {
                continue;
            }
            for &(neighbor, edge_idx) in &self.adjacency[node] {
                let edge = &self.edges[edge_idx];
                if !types.contains(&edge.edge_type()) {
                    continue;
                }
                if seed_indices.contains(&neighbor) {
                    continue;
                }
                let entry = hits.entry(neighbor).or_insert_with(|| NeighborHit {
                    clause_id: self.clauses[neighbor].id().clone(),
                    distance: depth + 1,
                    best_confidence: edge.confidence(),
                });
                if edge.confidence() > entry.best_confidence && entry.distance == depth + 1 {
                    entry.best_confidence = edge.confidence();
                }
                if visited.insert(neighbor) {
                    queue.push_back((neighbor, depth + 1));
                }
            }
        }

        let mut result: Vec<NeighborHit> = hits.into_values().collect();
        // closest first, then highest confidence, then ascending ID
        result.sort_by(|a, b| {
            a.distance
                .cmp(&b.distance)
                .then(
                    b.best_confidence
                        .partial_cmp(&a.best_confidence)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
                .then(a.clause_id.cmp(&b.clause_id))
        });
        Ok(result)
    }

    /// Set-valued neighbor query per the store contract: the union of
    /// reached IDs, excluding the seeds themselves.
    pub fn neighbors(
        &self,
        seeds: &[ClauseId],
        hops: usize,
        types: &[EdgeType],
    ) -> Result<BTreeSet<ClauseId>, DomainError> {
        Ok(self
            .expand(seeds, hops, types)?
            .into_iter()
            .map(|hit| hit.clause_id)
            .collect())
    }

    /// Distinct edges connecting `id` to any clause in `seeds`, in either
    /// orientation. Used for path support and role assignment.
    pub fn connecting_edges(&self, id: &ClauseId, seeds: &BTreeSet<ClauseId>) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| !e.is_self_loop())
            .filter(|e| {
                (e.source() == id && seeds.contains(e.target()))
                    || (e.target() == id && seeds.contains(e.source()))
            })
            .collect()
    }
}
