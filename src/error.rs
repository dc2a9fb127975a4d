use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use thiserror::Error;

/// Terminal reasons a planning request can fail with after its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanningFailure {
    NoValidDays,
    BikeDistanceLimitsExceeded,
    PlanningFailed,
    DeadlineExceeded,
}

impl PlanningFailure {
    /// Stable machine-readable code returned to API callers
    pub fn code(&self) -> &'static str {
        match self {
            PlanningFailure::NoValidDays => "no_valid_days",
            PlanningFailure::BikeDistanceLimitsExceeded => "bike_distance_limits_exceeded",
            PlanningFailure::PlanningFailed => "planning_failed",
            PlanningFailure::DeadlineExceeded => "deadline_exceeded",
        }
    }
}

impl fmt::Display for PlanningFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Routing error: {0}")]
    Routing(String),

    #[error("AI service error: {0}")]
    AiService(String),

    #[error("AI response format error: {0}")]
    AiFormat(String),

    #[error("Walking loop failed: {0}")]
    WalkingLoop(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Planning failed: {0}")]
    Planning(PlanningFailure),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Planning-level failures (as opposed to per-attempt ones) end the retry loop.
    pub fn planning_failure(&self) -> Option<PlanningFailure> {
        match self {
            AppError::Planning(failure) => Some(*failure),
            _ => None,
        }
    }
}

// Convert AppError into HTTP responses
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(ref e) => (StatusCode::BAD_REQUEST, e.clone()),
            AppError::Routing(ref e) => {
                tracing::error!("Routing error: {}", e);
                (StatusCode::BAD_GATEWAY, "Routing service error".to_string())
            }
            AppError::AiService(ref e) | AppError::AiFormat(ref e) => {
                tracing::error!("AI service error: {}", e);
                (StatusCode::BAD_GATEWAY, "Itinerary service error".to_string())
            }
            AppError::WalkingLoop(ref e) | AppError::ConstraintViolation(ref e) => {
                tracing::warn!("Planning step failed: {}", e);
                (StatusCode::BAD_GATEWAY, e.clone())
            }
            AppError::Planning(failure) => {
                tracing::warn!(reason = failure.code(), "Planning failed: {}", failure);
                (StatusCode::BAD_GATEWAY, failure.code().to_string())
            }
            AppError::Internal(ref e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Unknown error"),
            "message": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
