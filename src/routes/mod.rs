pub mod debug;
pub mod plan;
pub mod snap;

use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/llm/plan", post(plan::create_plan))
        .route("/routes/osrm", post(snap::snap_route))
        .route("/debug/health", get(debug::health_check))
        .fallback(not_found)
        .with_state(state)
}

/// JSON 404 for any unmatched path
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}
