use crate::error::{AppError, Result};
use crate::models::trip::{PlanRequest, PlanResponse};
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

/// POST /llm/plan
/// Build a one or two day walking or biking itinerary for a country
pub async fn create_plan(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PlanRequest>, JsonRejection>,
) -> Result<Json<PlanResponse>> {
    let Json(request) =
        payload.map_err(|rejection| AppError::InvalidInput(rejection.body_text()))?;

    let (day_count, constraints) = request.resolve(
        &state.planner_config.constraints(),
        state.planner_config.default_max_days,
    );

    if constraints.walking_min_km > constraints.walking_max_km {
        return Err(AppError::InvalidInput(format!(
            "limits.min ({}) must not exceed limits.max ({})",
            constraints.walking_min_km, constraints.walking_max_km
        )));
    }

    tracing::info!(
        country = %request.country,
        trip_type = %request.trip_type,
        days = day_count,
        "Plan request: {} / {}, {} day(s)",
        request.country, request.trip_type, day_count
    );

    let plan = state
        .planner
        .plan_trip_with_deadline(
            &request.country,
            &request.trip_type,
            day_count,
            &constraints,
            state.plan_deadline,
        )
        .await?;

    Ok(Json(PlanResponse { days: plan.days }))
}
