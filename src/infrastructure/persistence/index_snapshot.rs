//! JSON snapshot for the vector index

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{read_optional, write_atomic};
use crate::domain::clause::ClauseId;
use crate::domain::index::{VectorIndex, VectorIndexStore};
use crate::domain::DomainError;

#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    entries: Vec<IndexEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexEntry {
    clause_id: ClauseId,
    embedding: Vec<f32>,
}

#[derive(Debug, Clone)]
pub struct FileVectorIndexStore {
    path: PathBuf,
}

impl FileVectorIndexStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl VectorIndexStore for FileVectorIndexStore {
    async fn load(&self) -> Result<Option<VectorIndex>, DomainError> {
        let Some(bytes) = read_optional(&self.path).await? else {
            return Ok(None);
        };

        let snapshot: IndexSnapshot = serde_json::from_slice(&bytes).map_err(|e| {
            DomainError::storage(format!("Corrupt index snapshot at {:?}: {}", self.path, e))
        })?;

        let mut index = VectorIndex::new();
        for entry in snapshot.entries {
            index.add(entry.clause_id, entry.embedding)?;
        }
        Ok(Some(index))
    }

    async fn save(&self, index: &VectorIndex) -> Result<(), DomainError> {
        let snapshot = IndexSnapshot {
            entries: index
                .entries()
                .map(|(clause_id, embedding)| IndexEntry {
                    clause_id: clause_id.clone(),
                    embedding: embedding.clone(),
                })
                .collect(),
        };
        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| DomainError::storage(format!("Failed to encode index snapshot: {}", e)))?;

        write_atomic(&self.path, &bytes).await
    }
}
