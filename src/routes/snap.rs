use crate::models::{SnapRequest, SnapResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /routes/osrm
/// Snap waypoints to the road network and route through them.
/// Failures, including a body that does not parse, come back as
/// `{distanceKm: null, geometry: []}` with a 200.
pub async fn snap_route(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SnapRequest>, JsonRejection>,
) -> Json<SnapResponse> {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            tracing::warn!("Snap request rejected: {}", rejection.body_text());
            return Json(SnapResponse::empty());
        }
    };

    tracing::info!(
        profile = %request.profile,
        waypoints = request.waypoints.len(),
        close_loop = request.close_loop,
        "Snap request: {} waypoints, profile={}, loop={}",
        request.waypoints.len(),
        request.profile,
        request.close_loop
    );

    Json(
        state
            .snapper
            .snap_route(&request.profile, &request.waypoints, request.close_loop)
            .await,
    )
}
