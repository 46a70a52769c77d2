//! Clause graph persistence contract

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::ClauseGraph;
use crate::domain::error::DomainError;

/// Persisted load/save for clause graph snapshots.
///
/// `load` returns `None` when no snapshot exists; callers treat this as
/// "graph not yet built", not an error. `save` must be atomic: a partial
/// build is never observable on disk.
#[async_trait]
pub trait ClauseGraphStore: Send + Sync + Debug {
    async fn load(&self) -> Result<Option<ClauseGraph>, DomainError>;

    async fn save(&self, graph: &ClauseGraph) -> Result<(), DomainError>;
}
