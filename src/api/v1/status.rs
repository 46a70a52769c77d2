//! Index status endpoint handlers

use axum::extract::{Query, State};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json, StatusParams};
use crate::domain::status::IndexStatus;

/// GET /v1/status?documents=<url>
pub async fn get_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<IndexStatus>, ApiError> {
    debug!(documents = %params.documents, "Reporting index status");

    let status = state
        .query_service
        .status(&params.documents)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(status))
}

/// POST /v1/rebuild?documents=<url>
pub async fn rebuild(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> Result<Json<IndexStatus>, ApiError> {
    debug!(documents = %params.documents, "Rebuilding document index");

    let status = state
        .query_service
        .rebuild(&params.documents)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(status))
}
