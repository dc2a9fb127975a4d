use crate::constants::LOOP_CLOSURE_TOLERANCE_KM;
use crate::models::{Coordinates, SnapResponse, TransportMode};
use crate::services::routing::{ProfileChain, RoutingClient};
use futures::future::join_all;

/// Snaps user-drawn waypoints to the road network and routes through them.
///
/// Never fails: any problem degrades to [`SnapResponse::empty`].
#[derive(Clone)]
pub struct WaypointSnapper {
    routing: RoutingClient,
}

impl WaypointSnapper {
    pub fn new(routing: RoutingClient) -> Self {
        WaypointSnapper { routing }
    }

    pub async fn snap_route(
        &self,
        profile: &str,
        waypoints: &[Coordinates],
        close_loop: bool,
    ) -> SnapResponse {
        if waypoints.len() < 2 {
            tracing::debug!(
                waypoints = waypoints.len(),
                "Snap request with fewer than 2 waypoints"
            );
            return SnapResponse::empty();
        }

        let chain = profile_chain(profile);

        // A point that cannot be snapped keeps its original position
        let mut snapped: Vec<Coordinates> =
            join_all(waypoints.iter().map(|wp| self.routing.nearest(&chain, *wp)))
                .await
                .into_iter()
                .zip(waypoints)
                .map(|(result, original)| result.unwrap_or(*original))
                .collect();

        if close_loop {
            let first = snapped[0];
            let last = snapped[snapped.len() - 1];
            if first.distance_to(&last) > LOOP_CLOSURE_TOLERANCE_KM {
                snapped.push(first);
            }
        }

        match self.routing.route(&chain, &snapped).await {
            Ok(route) => {
                // Unrounded, unlike planned days
                let distance_km =
                    (route.distance_meters != 0.0).then(|| route.distance_meters / 1000.0);
                tracing::debug!(
                    profile = profile,
                    waypoints = snapped.len(),
                    path_points = route.geometry.len(),
                    "Snapped {} waypoints onto a {:?}km route",
                    snapped.len(),
                    distance_km
                );
                SnapResponse {
                    distance_km,
                    geometry: route.geometry.iter().map(Coordinates::to_lat_lng).collect(),
                }
            }
            Err(e) => {
                tracing::warn!(profile = profile, error = %e, "Snap routing failed: {}", e);
                SnapResponse::empty()
            }
        }
    }
}

/// Requested profile first, then the synonyms of its travel mode
fn profile_chain(profile: &str) -> ProfileChain {
    match profile.parse::<TransportMode>() {
        Ok(TransportMode::Walk) => ProfileChain::walking(profile),
        Ok(TransportMode::Bike) => ProfileChain::biking(profile),
        Err(_) => ProfileChain::single(profile),
    }
}
