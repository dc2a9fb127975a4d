use crate::services::geo_math;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    #[serde(alias = "lon")]
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(format!(
                "Invalid coordinates: ({}, {}) must be finite numbers",
                lat, lng
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// True when both components are finite and inside the WGS84 ranges
    pub fn is_valid(lat: f64, lng: f64) -> bool {
        Self::new(lat, lng).is_ok()
    }

    /// Great-circle distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        geo_math::haversine_km(self, other)
    }

    /// `[lat, lng]` pair, the order used by the snapping endpoint
    pub fn to_lat_lng(&self) -> [f64; 2] {
        [self.lat, self.lng]
    }
}

/// A validated coordinate with a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NamedPoint {
    pub name: String,
    #[serde(flatten)]
    pub coordinates: Coordinates,
}

impl NamedPoint {
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        NamedPoint {
            name: name.into(),
            coordinates,
        }
    }
}
