//! Application state for shared services

use std::sync::Arc;

use crate::domain::status::IndexStatus;
use crate::domain::DomainError;
use crate::infrastructure::services::QueryService;

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub query_service: Arc<dyn QueryServiceTrait>,
    /// Directory holding persisted document snapshots
    pub data_dir: std::path::PathBuf,
}

/// Trait for query service operations
#[async_trait::async_trait]
pub trait QueryServiceTrait: Send + Sync {
    /// Answer questions against a document, building its graph and
    /// index first when needed
    async fn answer_questions(
        &self,
        document_url: &str,
        questions: &[String],
        use_graph: bool,
    ) -> Result<Vec<String>, DomainError>;

    /// Statistics for an already-built document
    async fn status(&self, document_url: &str) -> Result<IndexStatus, DomainError>;

    /// Force a rebuild of a document's graph and index
    async fn rebuild(&self, document_url: &str) -> Result<IndexStatus, DomainError>;
}

#[async_trait::async_trait]
impl QueryServiceTrait for QueryService {
    async fn answer_questions(
        &self,
        document_url: &str,
        questions: &[String],
        use_graph: bool,
    ) -> Result<Vec<String>, DomainError> {
        QueryService::answer_questions(self, document_url, questions, use_graph).await
    }

    async fn status(&self, document_url: &str) -> Result<IndexStatus, DomainError> {
        QueryService::status(self, document_url).await
    }

    async fn rebuild(&self, document_url: &str) -> Result<IndexStatus, DomainError> {
        QueryService::rebuild(self, document_url).await
    }
}
