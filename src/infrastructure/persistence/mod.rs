//! File-backed snapshot stores for graph and vector index

mod graph_snapshot;
mod index_snapshot;

pub use graph_snapshot::FileClauseGraphStore;
pub use index_snapshot::FileVectorIndexStore;

use std::path::Path;

use crate::domain::DomainError;

/// Write `contents` to `path` atomically: write a sibling temp file,
/// then rename over the target. Readers either see the previous
/// snapshot or the complete new one, never a partial write.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), DomainError> {
    let parent = path
        .parent()
        .ok_or_else(|| DomainError::storage("Snapshot path has no parent directory"))?;

    tokio::fs::create_dir_all(parent)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create snapshot dir: {}", e)))?;

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, contents)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to write snapshot: {}", e)))?;

    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to swap snapshot into place: {}", e)))
}

/// Read a snapshot file, mapping "not found" to `None`.
async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>, DomainError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(DomainError::storage(format!(
            "Failed to read snapshot: {}",
            e
        ))),
    }
}
