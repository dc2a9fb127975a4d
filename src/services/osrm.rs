use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, RouteResult};
use crate::services::routing::RoutingBackend;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// OSRM success status code
const OSRM_OK: &str = "Ok";

/// HTTP client for an OSRM-compatible routing server.
#[derive(Clone)]
pub struct OsrmClient {
    client: Client,
    base_url: String,
    nearest_timeout: Duration,
    route_timeout: Duration,
}

impl OsrmClient {
    pub fn new(base_url: String) -> Self {
        Self::with_timeouts(
            base_url,
            Duration::from_secs(DEFAULT_NEAREST_TIMEOUT_SECONDS),
            Duration::from_secs(DEFAULT_ROUTE_TIMEOUT_SECONDS),
        )
    }

    pub fn with_timeouts(
        base_url: String,
        nearest_timeout: Duration,
        route_timeout: Duration,
    ) -> Self {
        OsrmClient {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            nearest_timeout,
            route_timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        url: &str,
        query: &[(&str, &str)],
        timeout: Duration,
        profile: &str,
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| AppError::Routing(format!("Request failed ({}): {}", profile, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::debug!(
                status = %status,
                profile = profile,
                "OSRM HTTP error {}: {}",
                status, error_text
            );
            return Err(AppError::Routing(format!(
                "HTTP {} ({}): {}",
                status, profile, error_text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Routing(format!("Failed to parse response ({}): {}", profile, e)))
    }
}

#[async_trait]
impl RoutingBackend for OsrmClient {
    /// Snap a coordinate to the closest routable point for `profile`
    async fn nearest(&self, profile: &str, coord: Coordinates) -> Result<Coordinates> {
        let url = format!(
            "{}/nearest/v1/{}/{},{}",
            self.base_url, profile, coord.lng, coord.lat
        );

        let nearest: NearestApiResponse = self
            .get_json(&url, &[("number", "1")], self.nearest_timeout, profile)
            .await?;

        if nearest.code != OSRM_OK {
            return Err(AppError::Routing(format!(
                "OSRM nearest failed ({}): code {}",
                profile, nearest.code
            )));
        }

        let waypoint = nearest
            .waypoints
            .first()
            .ok_or_else(|| AppError::Routing(format!("OSRM nearest failed ({}): no waypoints", profile)))?;

        Coordinates::new(waypoint.location[1], waypoint.location[0])
            .map_err(|e| AppError::Routing(format!("OSRM nearest returned {}", e)))
    }

    /// Route through `waypoints` in order with full GeoJSON geometry
    async fn route(&self, profile: &str, waypoints: &[Coordinates]) -> Result<RouteResult> {
        if waypoints.len() < 2 {
            return Err(AppError::InvalidInput(
                "At least 2 waypoints required".to_string(),
            ));
        }

        // Format coordinates as "lng,lat;lng,lat;..."
        let coordinates_str = waypoints
            .iter()
            .map(|c| format!("{},{}", c.lng, c.lat))
            .collect::<Vec<_>>()
            .join(";");

        let url = format!("{}/route/v1/{}/{}", self.base_url, profile, coordinates_str);

        tracing::debug!(
            waypoints = waypoints.len(),
            profile = profile,
            "OSRM route request: {} waypoints, profile {}",
            waypoints.len(), profile
        );

        let directions: RouteApiResponse = self
            .get_json(
                &url,
                &[
                    ("geometries", "geojson"),
                    ("overview", "full"),
                    ("steps", "false"),
                ],
                self.route_timeout,
                profile,
            )
            .await?;

        if directions.code != OSRM_OK {
            return Err(AppError::Routing(format!(
                "OSRM route failed ({}): code {}",
                profile, directions.code
            )));
        }

        let route = directions
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Routing(format!("OSRM route failed ({}): no routes", profile)))?;

        tracing::debug!(
            distance_km = %format!("{:.2}", route.distance / 1000.0),
            duration_min = %format!("{:.0}", route.duration / 60.0),
            path_points = route.geometry.coordinates.len(),
            "OSRM response: {:.2}km, {:.0}min, {} path points",
            route.distance / 1000.0, route.duration / 60.0, route.geometry.coordinates.len()
        );

        Ok(RouteResult {
            distance_meters: route.distance,
            duration_seconds: route.duration,
            geometry: route.geometry.to_coordinates(),
        })
    }
}

// OSRM API response types

#[derive(Debug, Deserialize)]
struct NearestApiResponse {
    code: String,
    #[serde(default)]
    waypoints: Vec<NearestWaypoint>,
}

#[derive(Debug, Deserialize)]
struct NearestWaypoint {
    location: [f64; 2], // [lng, lat]
}

#[derive(Debug, Deserialize)]
struct RouteApiResponse {
    code: String,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    distance: f64, // meters
    duration: f64, // seconds
    geometry: OsrmGeometry,
}

#[derive(Debug, Deserialize)]
struct OsrmGeometry {
    coordinates: Vec<[f64; 2]>, // [lng, lat] pairs
}

impl OsrmGeometry {
    fn to_coordinates(&self) -> Vec<Coordinates> {
        self.coordinates
            .iter()
            .filter_map(|coord| Coordinates::new(coord[1], coord[0]).ok())
            .collect()
    }
}
