use crate::constants::*;
use crate::models::{Coordinates, NamedPoint, TransportMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripType {
    Hike,
    Bike,
}

impl TripType {
    pub fn transport_mode(&self) -> TransportMode {
        match self {
            TripType::Hike => TransportMode::Walk,
            TripType::Bike => TransportMode::Bike,
        }
    }
}

impl fmt::Display for TripType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripType::Hike => write!(f, "hike"),
            TripType::Bike => write!(f, "bike"),
        }
    }
}

impl FromStr for TripType {
    type Err = String;

    /// Anything mentioning hiking, walking or foot travel is a hike; every
    /// other non-empty value is treated as a bike trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        if lowered.is_empty() {
            return Err("tripType is required".to_string());
        }
        if ["hike", "walk", "foot"].iter().any(|k| lowered.contains(k)) {
            Ok(TripType::Hike)
        } else {
            Ok(TripType::Bike)
        }
    }
}

/// A point exactly as the itinerary service returned it. Nothing here is
/// validated; non-numeric coordinates are carried as NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedPoint {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl SeedPoint {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64) -> Self {
        SeedPoint {
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn has_valid_coordinates(&self) -> bool {
        Coordinates::is_valid(self.lat, self.lon)
    }

    pub fn to_named_point(&self) -> Result<NamedPoint, String> {
        let coordinates = Coordinates::new(self.lat, self.lon)
            .map_err(|e| format!("{} for '{}'", e, self.name))?;
        Ok(NamedPoint::new(self.name.clone(), coordinates))
    }
}

/// One day of an itinerary skeleton.
#[derive(Debug, Clone, PartialEq)]
pub enum DaySeed {
    Hike {
        day: Option<u32>,
        target: Option<SeedPoint>,
    },
    Bike {
        day: Option<u32>,
        from: Option<SeedPoint>,
        to: Option<SeedPoint>,
    },
}

impl DaySeed {
    pub fn day(&self) -> Option<u32> {
        match self {
            DaySeed::Hike { day, .. } | DaySeed::Bike { day, .. } => *day,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub day: u32,
    pub waypoints: Vec<NamedPoint>,
    pub profile: TransportMode,
    pub distance_km: f64,
    pub duration_min: f64,
    pub geometry: Vec<Coordinates>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub trip_type: TripType,
    pub country: String,
    pub days: Vec<Day>,
}

impl Plan {
    pub fn total_distance_km(&self) -> f64 {
        self.days.iter().map(|d| d.distance_km).sum()
    }
}

/// Distance caps and retry budgets for one planning request
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub walking_min_km: f64,
    pub walking_max_km: f64,
    pub bike_max_per_day_km: f64,
    pub bike_total_max_km: f64,
    pub max_loop_tries: usize,
    pub max_replans: usize,
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            walking_min_km: DEFAULT_WALKING_MIN_KM,
            walking_max_km: DEFAULT_WALKING_MAX_KM,
            bike_max_per_day_km: DEFAULT_BIKE_MAX_PER_DAY_KM,
            bike_total_max_km: DEFAULT_BIKE_TOTAL_MAX_KM,
            max_loop_tries: DEFAULT_MAX_LOOP_TRIES,
            max_replans: DEFAULT_MAX_REPLANS,
        }
    }
}

impl Constraints {
    pub fn clamp_day_count(day_count: u32) -> u32 {
        day_count.clamp(MIN_TRIP_DAYS, MAX_TRIP_DAYS)
    }

    /// Total cap that applies to a biking plan of `day_count` days
    pub fn bike_effective_limit_km(&self, day_count: u32) -> f64 {
        if day_count > 1 {
            self.bike_total_max_km
        } else {
            self.bike_max_per_day_km
        }
    }
}

// Request/Response types for the planning endpoint

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    pub max_days: Option<u32>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_per_day_km: Option<f64>,
    pub total_max: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub trip_type: String,
    #[serde(default)]
    pub limits: Option<PlanLimits>,
}

impl PlanRequest {
    /// Resolve requested limits against configured defaults.
    /// Returns the requested day count (unclamped) and the constraints.
    pub fn resolve(&self, defaults: &Constraints, default_max_days: u32) -> (u32, Constraints) {
        let limits = self.limits.clone().unwrap_or_default();
        let day_count = limits.max_days.unwrap_or(default_max_days);
        let constraints = Constraints {
            walking_min_km: limits.min.unwrap_or(defaults.walking_min_km),
            walking_max_km: limits.max.unwrap_or(defaults.walking_max_km),
            bike_max_per_day_km: limits.max_per_day_km.unwrap_or(defaults.bike_max_per_day_km),
            bike_total_max_km: limits.total_max.unwrap_or(defaults.bike_total_max_km),
            ..defaults.clone()
        };
        (day_count, constraints)
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub days: Vec<Day>,
}
