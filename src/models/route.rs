use crate::models::Coordinates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mode tag carried by a built day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TransportMode {
    #[default]
    #[serde(rename = "foot")]
    Walk,
    #[serde(rename = "bike")]
    Bike,
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportMode::Walk => write!(f, "foot"),
            TransportMode::Bike => write!(f, "bike"),
        }
    }
}

impl FromStr for TransportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "foot" | "walk" | "walking" => Ok(TransportMode::Walk),
            "bike" | "cycling" | "bicycle" => Ok(TransportMode::Bike),
            _ => Err(format!("Invalid transport mode: '{}'", s)),
        }
    }
}

/// A computed route as reported by the routing service.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    pub geometry: Vec<Coordinates>,
}

impl RouteResult {
    /// Distance in kilometers, rounded to two decimals
    pub fn distance_km(&self) -> f64 {
        round_to(self.distance_meters / 1000.0, 2)
    }

    /// Duration in minutes, rounded to one decimal
    pub fn duration_minutes(&self) -> f64 {
        round_to(self.duration_seconds / 60.0, 1)
    }
}

pub(crate) fn round_to(value: f64, decimal_places: u32) -> f64 {
    let multiplier = 10_f64.powi(decimal_places as i32);
    (value * multiplier).round() / multiplier
}

// Request/Response types for the snapping endpoint

#[derive(Debug, Deserialize)]
pub struct SnapRequest {
    #[serde(default = "default_snap_profile")]
    pub profile: String,
    #[serde(default)]
    pub waypoints: Vec<Coordinates>,
    #[serde(default, rename = "loop")]
    pub close_loop: bool,
}

fn default_snap_profile() -> String {
    "foot".to_string()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapResponse {
    pub distance_km: Option<f64>,
    /// `[lat, lng]` pairs
    pub geometry: Vec<[f64; 2]>,
}

impl SnapResponse {
    /// Soft-failure shape returned instead of an error
    pub fn empty() -> Self {
        SnapResponse {
            distance_km: None,
            geometry: Vec::new(),
        }
    }
}
