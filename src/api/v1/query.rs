//! Query endpoint handler

use axum::extract::State;
use tracing::debug;
use validator::Validate;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, QueryRequest, QueryResponse};

/// POST /v1/query
pub async fn answer_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, ApiError> {
    validate_request(&request)?;

    debug!(
        documents = %request.documents,
        questions = request.questions.len(),
        use_graph = request.use_graph,
        "Answering query batch"
    );

    let answers = state
        .query_service
        .answer_questions(&request.documents, &request.questions, request.use_graph)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(QueryResponse { answers }))
}

fn validate_request(request: &QueryRequest) -> Result<(), ApiError> {
    request
        .validate()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    // validator's url check accepts any scheme; we can only fetch http(s)
    if !request.documents.starts_with("http://") && !request.documents.starts_with("https://") {
        return Err(
            ApiError::bad_request("documents must be an http(s) URL").with_param("documents")
        );
    }
    if request.questions.iter().any(|q| q.trim().is_empty()) {
        return Err(
            ApiError::bad_request("questions must not contain blank entries")
                .with_param("questions"),
        );
    }
    Ok(())
}
