//! Per-document build/query sessions
//!
//! Each document URL owns one session holding the current in-memory
//! graph/index snapshot. Queries read the snapshot through an RwLock;
//! a build constructs fresh structures off to the side and swaps them
//! in atomically, so readers always see a complete pair.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, MutexGuard, RwLock};
use tracing::warn;

use crate::domain::graph::{ClauseGraph, ClauseGraphStore};
use crate::domain::index::{VectorIndex, VectorIndexStore};
use crate::domain::DomainError;
use crate::infrastructure::persistence::{FileClauseGraphStore, FileVectorIndexStore};

const GRAPH_SNAPSHOT_FILE: &str = "graph.json";
const INDEX_SNAPSHOT_FILE: &str = "index.json";

/// Stable directory name for a document URL
pub fn document_fingerprint(url: &str) -> String {
    hex::encode(Sha256::digest(url.as_bytes()))
}

/// An immutable graph/index pair. Cheap to clone; queries hold one for
/// their whole lifetime and are unaffected by concurrent rebuilds.
#[derive(Debug, Clone)]
pub struct DocumentSnapshot {
    pub graph: Arc<ClauseGraph>,
    pub index: Arc<VectorIndex>,
}

#[derive(Debug)]
pub struct DocumentSession {
    graph_store: FileClauseGraphStore,
    index_store: FileVectorIndexStore,
    snapshot: RwLock<Option<DocumentSnapshot>>,
    build_lock: Mutex<()>,
}

impl DocumentSession {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            graph_store: FileClauseGraphStore::new(dir.join(GRAPH_SNAPSHOT_FILE)),
            index_store: FileVectorIndexStore::new(dir.join(INDEX_SNAPSHOT_FILE)),
            snapshot: RwLock::new(None),
            build_lock: Mutex::new(()),
        }
    }

    /// The currently installed snapshot, if any
    pub async fn current(&self) -> Option<DocumentSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Serialize builders for this document. Readers are not blocked;
    /// they keep seeing the previous snapshot until the swap.
    pub async fn begin_build(&self) -> MutexGuard<'_, ()> {
        self.build_lock.lock().await
    }

    /// Try to restore a snapshot persisted by an earlier run. Returns
    /// `None` when either half is missing; a half-persisted state is
    /// ignored rather than trusted.
    pub async fn restore(&self) -> Result<Option<DocumentSnapshot>, DomainError> {
        let graph = self.graph_store.load().await?;
        let index = self.index_store.load().await?;

        match (graph, index) {
            (Some(graph), Some(index)) => Ok(Some(self.install(graph, index).await)),
            (None, None) => Ok(None),
            _ => {
                warn!("partial snapshot on disk, ignoring and rebuilding");
                Ok(None)
            }
        }
    }

    /// Persist and swap in a freshly built pair. Persistence failures
    /// abort before the swap, leaving the previous snapshot in place.
    pub async fn commit(
        &self,
        graph: ClauseGraph,
        index: VectorIndex,
    ) -> Result<DocumentSnapshot, DomainError> {
        self.graph_store.save(&graph).await?;
        self.index_store.save(&index).await?;
        Ok(self.install(graph, index).await)
    }

    async fn install(&self, graph: ClauseGraph, index: VectorIndex) -> DocumentSnapshot {
        let snapshot = DocumentSnapshot {
            graph: Arc::new(graph),
            index: Arc::new(index),
        };
        *self.snapshot.write().await = Some(snapshot.clone());
        snapshot
    }
}

/// Lazily created sessions keyed by document fingerprint
#[derive(Debug)]
pub struct SessionRegistry {
    data_dir: PathBuf,
    sessions: Mutex<HashMap<String, Arc<DocumentSession>>>,
}

impl SessionRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub async fn session(&self, url: &str) -> Arc<DocumentSession> {
        let key = document_fingerprint(url);
        let mut sessions = self.sessions.lock().await;
        sessions
            .entry(key.clone())
            .or_insert_with(|| Arc::new(DocumentSession::new(self.data_dir.join(key))))
            .clone()
    }
}
