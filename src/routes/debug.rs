use crate::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

/// GET /debug/health - Report which external services are configured
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "checks": {
            "routing_base_url": state.routing_base_url,
            "llm_model": state.llm_model,
            "llm_key_configured": state.llm_key_configured,
        }
    }))
}
