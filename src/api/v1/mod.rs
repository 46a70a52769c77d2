//! v1 API endpoints

pub mod query;
pub mod status;

use axum::{
    routing::{get, post},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/query", post(query::answer_query))
        .route("/status", get(status::get_status))
        .route("/rebuild", post(status::rebuild))
}
