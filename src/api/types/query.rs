//! Request and response types for the query API

use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_use_graph() -> bool {
    true
}

/// POST /v1/query request body
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct QueryRequest {
    /// URL of the policy document to answer against
    #[validate(url(message = "documents must be a valid URL"))]
    pub documents: String,
    /// Questions to answer, in order
    #[validate(length(min = 1, message = "questions must not be empty"))]
    pub questions: Vec<String>,
    /// Disable graph expansion to fall back to dense-only retrieval
    #[serde(default = "default_use_graph")]
    pub use_graph: bool,
}

/// POST /v1/query response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    /// One answer per question, in request order
    pub answers: Vec<String>,
}

/// GET /v1/status query parameters
#[derive(Debug, Clone, Deserialize)]
pub struct StatusParams {
    /// URL of the document to report on
    pub documents: String,
}
