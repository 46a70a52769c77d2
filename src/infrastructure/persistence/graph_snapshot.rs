//! JSON node/edge list snapshot for the clause graph

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{read_optional, write_atomic};
use crate::domain::clause::Clause;
use crate::domain::graph::{ClauseGraph, ClauseGraphStore, Edge};
use crate::domain::DomainError;

/// On-disk snapshot shape. Adjacency is derived, so only the node and
/// edge lists are persisted; loading re-runs full graph validation.
#[derive(Debug, Serialize, Deserialize)]
struct GraphSnapshot {
    clauses: Vec<Clause>,
    edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
pub struct FileClauseGraphStore {
    path: PathBuf,
}

impl FileClauseGraphStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ClauseGraphStore for FileClauseGraphStore {
    async fn load(&self) -> Result<Option<ClauseGraph>, DomainError> {
        let Some(bytes) = read_optional(&self.path).await? else {
            return Ok(None);
        };

        let snapshot: GraphSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::storage(format!("Corrupt graph snapshot at {:?}: {}", self.path, e))
        })?;

        ClauseGraph::new(snapshot.clauses, snapshot.edges).map(Some)
    }

    async fn save(&self, graph: &ClauseGraph) -> Result<(), DomainError> {
        let snapshot = GraphSnapshot {
            clauses: graph.clauses().to_vec(),
            edges: graph.edges().to_vec(),
        };
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| DomainError::storage(format!("Failed to encode graph snapshot: {}", e)))?;

        write_atomic(&self.path, &bytes).await
    }
}
