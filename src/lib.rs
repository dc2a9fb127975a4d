// Library exports for testing and reusability

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use error::{AppError, Result};

use config::PlannerConfig;
use services::planner::Planner;
use services::waypoint_snapper::WaypointSnapper;
use std::time::Duration;

// App state for sharing across the application
pub struct AppState {
    pub planner: Planner,
    pub snapper: WaypointSnapper,
    pub planner_config: PlannerConfig,
    pub plan_deadline: Duration,
    /// Reported by the health check
    pub routing_base_url: String,
    pub llm_model: String,
    pub llm_key_configured: bool,
}
