//! Vector index persistence contract

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::VectorIndex;
use crate::domain::error::DomainError;

/// Persisted load/save for vector index snapshots.
///
/// Mirrors [`crate::domain::graph::ClauseGraphStore`]: `load` returns
/// `None` when nothing was persisted yet, and `save` replaces the previous
/// snapshot atomically.
#[async_trait]
pub trait VectorIndexStore: Send + Sync + Debug {
    async fn load(&self) -> Result<Option<VectorIndex>, DomainError>;

    async fn save(&self, index: &VectorIndex) -> Result<(), DomainError>;
}
