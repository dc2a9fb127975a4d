//! Spherical-earth primitives used for loop candidate placement and
//! closure checks.

use crate::constants::EARTH_RADIUS_METERS;
use crate::error::{AppError, Result};
use crate::models::Coordinates;

/// Point reached by travelling `distance_meters` along the great circle that
/// leaves `origin` at `bearing_degrees` (clockwise from north).
///
/// The resulting longitude is normalized into (-180, 180].
pub fn destination_point(
    origin: &Coordinates,
    distance_meters: f64,
    bearing_degrees: f64,
) -> Result<Coordinates> {
    if !distance_meters.is_finite() || !bearing_degrees.is_finite() {
        return Err(AppError::InvalidInput(format!(
            "destination_point needs finite distance and bearing, got {} m at {} deg",
            distance_meters, bearing_degrees
        )));
    }
    Coordinates::new(origin.lat, origin.lng).map_err(AppError::InvalidInput)?;

    let angular = distance_meters / EARTH_RADIUS_METERS;
    let theta = bearing_degrees.to_radians();
    let phi1 = origin.lat.to_radians();
    let lambda1 = origin.lng.to_radians();

    let sin_phi2 =
        phi1.sin() * angular.cos() + phi1.cos() * angular.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let y = theta.sin() * angular.sin() * phi1.cos();
    let x = angular.cos() - phi1.sin() * phi2.sin();
    let lambda2 = lambda1 + y.atan2(x);

    Coordinates::new(phi2.to_degrees(), normalize_longitude(lambda2.to_degrees()))
        .map_err(AppError::Internal)
}

/// Great-circle distance between two points in kilometers (haversine)
pub fn haversine_km(a: &Coordinates, b: &Coordinates) -> f64 {
    let earth_radius_km = EARTH_RADIUS_METERS / 1000.0;

    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    earth_radius_km * c
}

fn normalize_longitude(lng: f64) -> f64 {
    let wrapped = (lng + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}
