use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, Day, NamedPoint, RouteResult, SeedPoint, TransportMode};
use crate::services::geo_math;
use crate::services::routing::{ProfileChain, RoutingClient};
use rand::{rngs::StdRng, RngExt, SeedableRng};
use std::sync::{Arc, Mutex};

/// Where to try placing a loop start relative to the target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopCandidate {
    pub radius_meters: f64,
    pub bearing_degrees: f64,
}

/// Source of loop-start candidates. Injected so searches can be replayed.
pub trait LoopSampler: Send + Sync {
    fn next_candidate(&self) -> LoopCandidate;
}

/// Uniform radius in [1.5 km, 6 km] and bearing in [0, 360).
pub struct RandomLoopSampler {
    rng: Mutex<StdRng>,
}

impl RandomLoopSampler {
    pub fn new() -> Self {
        Self::seeded(rand::rng().random::<u64>())
    }

    pub fn seeded(seed: u64) -> Self {
        RandomLoopSampler {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Default for RandomLoopSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl LoopSampler for RandomLoopSampler {
    fn next_candidate(&self) -> LoopCandidate {
        // A poisoned lock only means another search panicked mid-draw; the
        // generator state is still usable.
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        LoopCandidate {
            radius_meters: rng
                .random_range(LOOP_START_MIN_RADIUS_METERS..=LOOP_START_MAX_RADIUS_METERS),
            bearing_degrees: rng.random_range(0.0..360.0),
        }
    }
}

/// Band and budget for one walking-loop search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSearch {
    pub min_km: f64,
    pub max_km: f64,
    pub max_tries: usize,
}

impl LoopSearch {
    fn midpoint_km(&self) -> f64 {
        (self.min_km + self.max_km) / 2.0
    }

    fn contains(&self, distance_km: f64) -> bool {
        distance_km >= self.min_km && distance_km <= self.max_km
    }
}

/// Result of a single loop try
enum LoopTry {
    InBand(Day),
    OutOfBand { deviation_km: f64, day: Day },
    Unroutable(AppError),
}

/// Turns seed entries into routed days.
#[derive(Clone)]
pub struct DayBuilder {
    routing: RoutingClient,
    walking_profiles: ProfileChain,
    biking_profiles: ProfileChain,
    sampler: Arc<dyn LoopSampler>,
}

impl DayBuilder {
    pub fn new(
        routing: RoutingClient,
        walking_profiles: ProfileChain,
        biking_profiles: ProfileChain,
        sampler: Arc<dyn LoopSampler>,
    ) -> Self {
        DayBuilder {
            routing,
            walking_profiles,
            biking_profiles,
            sampler,
        }
    }

    /// Randomized search for a loop start -> target -> start whose length
    /// falls inside the band.
    ///
    /// When no try lands inside the band, the routed try closest to the band
    /// midpoint is returned instead, so the distance of a walking day is a
    /// best effort rather than a guarantee.
    pub async fn build_walking_loop(
        &self,
        day_index: u32,
        target: &SeedPoint,
        search: &LoopSearch,
    ) -> Result<Day> {
        let target = target.to_named_point().map_err(AppError::InvalidInput)?;

        let mut best: Option<(f64, Day)> = None;
        let mut failures = 0usize;

        for attempt in 0..search.max_tries {
            let candidate = self.sampler.next_candidate();

            match self.try_loop(day_index, &target, candidate, search).await {
                LoopTry::InBand(day) => {
                    tracing::info!(
                        attempt = attempt + 1,
                        distance_km = day.distance_km,
                        target = %target.name,
                        "Walking loop around {} accepted on try {} ({:.2}km)",
                        target.name, attempt + 1, day.distance_km
                    );
                    return Ok(day);
                }
                LoopTry::OutOfBand { deviation_km, day } => {
                    tracing::debug!(
                        attempt = attempt + 1,
                        distance_km = day.distance_km,
                        band = %format!("{:.1}-{:.1}", search.min_km, search.max_km),
                        "Try {}: {:.2}km outside {:.1}-{:.1}km",
                        attempt + 1, day.distance_km, search.min_km, search.max_km
                    );
                    let improves = best
                        .as_ref()
                        .map_or(true, |(best_deviation, _)| deviation_km < *best_deviation);
                    if improves {
                        best = Some((deviation_km, day));
                    }
                }
                LoopTry::Unroutable(e) => {
                    failures += 1;
                    tracing::debug!(
                        attempt = attempt + 1,
                        error = %e,
                        "Try {}: no usable route: {}",
                        attempt + 1, e
                    );
                }
            }
        }

        match best {
            Some((deviation_km, day)) => {
                tracing::warn!(
                    distance_km = day.distance_km,
                    deviation_km = %format!("{:.2}", deviation_km),
                    tries = search.max_tries,
                    "No loop around {} landed in {:.1}-{:.1}km, returning closest ({:.2}km)",
                    target.name, search.min_km, search.max_km, day.distance_km
                );
                Ok(day)
            }
            None => Err(AppError::WalkingLoop(format!(
                "No routable loop around '{}' after {} tries ({} routing failures)",
                target.name, search.max_tries, failures
            ))),
        }
    }

    async fn try_loop(
        &self,
        day_index: u32,
        target: &NamedPoint,
        candidate: LoopCandidate,
        search: &LoopSearch,
    ) -> LoopTry {
        let start = match geo_math::destination_point(
            &target.coordinates,
            candidate.radius_meters,
            candidate.bearing_degrees,
        ) {
            Ok(start) => start,
            Err(e) => return LoopTry::Unroutable(e),
        };

        let (snapped_start, snapped_target, route) =
            match self.route_loop(start, target.coordinates).await {
                Ok(routed) => routed,
                Err(e) => return LoopTry::Unroutable(e),
            };

        let raw_km = route.distance_meters / 1000.0;
        let start_name = format!("Loop Start near {}", target.name);
        let day = build_day(
            day_index,
            vec![
                NamedPoint::new(start_name.clone(), snapped_start),
                NamedPoint::new(target.name.clone(), snapped_target),
                NamedPoint::new(start_name, snapped_start),
            ],
            TransportMode::Walk,
            route,
        );

        if search.contains(raw_km) {
            LoopTry::InBand(day)
        } else {
            LoopTry::OutOfBand {
                deviation_km: (raw_km - search.midpoint_km()).abs(),
                day,
            }
        }
    }

    async fn route_loop(
        &self,
        start: Coordinates,
        target: Coordinates,
    ) -> Result<(Coordinates, Coordinates, RouteResult)> {
        let chain = &self.walking_profiles;
        let snapped_start = self.routing.nearest(chain, start).await?;
        let snapped_target = self.routing.nearest(chain, target).await?;
        let route = self
            .routing
            .route(chain, &[snapped_start, snapped_target, snapped_start])
            .await?;
        Ok((snapped_start, snapped_target, route))
    }

    /// Direct route between two snapped cities
    pub async fn build_biking_day(
        &self,
        day_index: u32,
        from: &SeedPoint,
        to: &SeedPoint,
    ) -> Result<Day> {
        let from = from.to_named_point().map_err(AppError::InvalidInput)?;
        let to = to.to_named_point().map_err(AppError::InvalidInput)?;

        let chain = &self.biking_profiles;
        let snapped_from = self.routing.nearest(chain, from.coordinates).await?;
        let snapped_to = self.routing.nearest(chain, to.coordinates).await?;
        let route = self.routing.route(chain, &[snapped_from, snapped_to]).await?;

        let day = build_day(
            day_index,
            vec![
                NamedPoint::new(from.name.clone(), snapped_from),
                NamedPoint::new(to.name.clone(), snapped_to),
            ],
            TransportMode::Bike,
            route,
        );

        tracing::info!(
            day = day_index,
            distance_km = day.distance_km,
            "Biking day {}: {} -> {} ({:.2}km)",
            day_index, from.name, to.name, day.distance_km
        );

        Ok(day)
    }
}

fn build_day(
    day_index: u32,
    waypoints: Vec<NamedPoint>,
    profile: TransportMode,
    route: RouteResult,
) -> Day {
    Day {
        day: day_index,
        waypoints,
        profile,
        distance_km: route.distance_km(),
        duration_min: route.duration_minutes(),
        geometry: route.geometry,
    }
}
