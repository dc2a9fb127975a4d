use crate::error::{AppError, PlanningFailure, Result};
use crate::models::{Constraints, Day, DaySeed, Plan, SeedPoint, TripType};
use crate::services::day_builder::{DayBuilder, LoopSearch};
use crate::services::seed_generator::{BikeCaps, SeedGenerator};
use futures::future::join_all;
use std::time::Duration;
use tracing::instrument;

/// How one seed-and-build cycle ended
#[derive(Debug)]
enum AttemptOutcome {
    Accepted(Plan),
    NoValidDays,
    LimitsExceeded {
        over_day_cap: bool,
        total_km: f64,
        limit_km: f64,
    },
    Failed(AppError),
}

/// A seed entry that passed the skip rules, with its resolved day index
enum DayJob<'a> {
    Walk {
        day: u32,
        target: &'a SeedPoint,
    },
    Ride {
        day: u32,
        from: &'a SeedPoint,
        to: &'a SeedPoint,
    },
}

/// Seeds an itinerary, routes each day and replans until the result fits
/// the constraints or the attempt budget runs out.
#[derive(Clone)]
pub struct Planner {
    seed_generator: SeedGenerator,
    day_builder: DayBuilder,
}

impl Planner {
    pub fn new(seed_generator: SeedGenerator, day_builder: DayBuilder) -> Self {
        Planner {
            seed_generator,
            day_builder,
        }
    }

    #[instrument(skip(self, constraints), fields(plan_id = %uuid::Uuid::new_v4()))]
    pub async fn plan_trip(
        &self,
        country: &str,
        trip_type: &str,
        day_count: u32,
        constraints: &Constraints,
    ) -> Result<Plan> {
        self.run_plan(country, trip_type, day_count, constraints).await
    }

    /// Same as [`plan_trip`](Self::plan_trip), abandoning any in-flight call
    /// once `deadline` has elapsed.
    #[instrument(skip(self, constraints), fields(plan_id = %uuid::Uuid::new_v4()))]
    pub async fn plan_trip_with_deadline(
        &self,
        country: &str,
        trip_type: &str,
        day_count: u32,
        constraints: &Constraints,
        deadline: Duration,
    ) -> Result<Plan> {
        match tokio::time::timeout(
            deadline,
            self.run_plan(country, trip_type, day_count, constraints),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    deadline_secs = deadline.as_secs_f64(),
                    "Planning for {} exceeded its {:.1}s deadline",
                    country,
                    deadline.as_secs_f64()
                );
                Err(AppError::Planning(PlanningFailure::DeadlineExceeded))
            }
        }
    }

    async fn run_plan(
        &self,
        country: &str,
        trip_type: &str,
        day_count: u32,
        constraints: &Constraints,
    ) -> Result<Plan> {
        let country = country.trim();
        if country.is_empty() {
            return Err(AppError::InvalidInput("country is required".to_string()));
        }
        let trip_type: TripType = trip_type.parse().map_err(AppError::InvalidInput)?;
        let day_count = Constraints::clamp_day_count(day_count);
        let attempts = constraints.max_replans;

        tracing::info!(
            trip_type = %trip_type,
            days = day_count,
            attempts = attempts,
            "Planning {} {}-day {} trip",
            country, day_count, trip_type
        );

        for attempt in 1..=attempts {
            let is_last = attempt == attempts;

            match self
                .run_attempt(country, trip_type, day_count, constraints)
                .await
            {
                AttemptOutcome::Accepted(plan) => {
                    tracing::info!(
                        attempt = attempt,
                        days = plan.days.len(),
                        total_km = %format!("{:.2}", plan.total_distance_km()),
                        "Plan accepted on attempt {}/{}",
                        attempt, attempts
                    );
                    return Ok(plan);
                }
                AttemptOutcome::NoValidDays => {
                    tracing::warn!(attempt = attempt, "Attempt {}/{}: no usable days", attempt, attempts);
                    if is_last {
                        return Err(AppError::Planning(PlanningFailure::NoValidDays));
                    }
                }
                AttemptOutcome::LimitsExceeded {
                    over_day_cap,
                    total_km,
                    limit_km,
                } => {
                    tracing::warn!(
                        attempt = attempt,
                        over_day_cap = over_day_cap,
                        "Attempt {}/{}: {}",
                        attempt,
                        attempts,
                        AppError::ConstraintViolation(format!(
                            "{:.2}km against a {:.0}km limit",
                            total_km, limit_km
                        ))
                    );
                    if is_last {
                        return Err(AppError::Planning(
                            PlanningFailure::BikeDistanceLimitsExceeded,
                        ));
                    }
                }
                AttemptOutcome::Failed(e) => {
                    tracing::warn!(
                        attempt = attempt,
                        error = %e,
                        "Attempt {}/{} failed: {}",
                        attempt, attempts, e
                    );
                }
            }
        }

        Err(AppError::Planning(PlanningFailure::PlanningFailed))
    }

    async fn run_attempt(
        &self,
        country: &str,
        trip_type: TripType,
        day_count: u32,
        constraints: &Constraints,
    ) -> AttemptOutcome {
        let caps = match trip_type {
            TripType::Bike => Some(BikeCaps {
                max_per_day_km: constraints.bike_max_per_day_km,
                total_max_km: (day_count > 1).then_some(constraints.bike_total_max_km),
            }),
            TripType::Hike => None,
        };

        let seeds = match self
            .seed_generator
            .request_seed(country, trip_type, day_count, caps)
            .await
        {
            Ok(seeds) => seeds,
            Err(e) => return AttemptOutcome::Failed(e),
        };

        let jobs = plan_jobs(&seeds);
        if jobs.len() < seeds.len() {
            tracing::debug!(
                skipped = seeds.len() - jobs.len(),
                "Skipped {} unusable seed entries",
                seeds.len() - jobs.len()
            );
        }

        let search = LoopSearch {
            min_km: constraints.walking_min_km,
            max_km: constraints.walking_max_km,
            max_tries: constraints.max_loop_tries,
        };

        // join_all keeps seed order regardless of completion order
        let built = join_all(jobs.iter().map(|job| self.build_day(job, &search))).await;

        let mut days: Vec<Day> = Vec::with_capacity(built.len());
        for result in built {
            match result {
                Ok(day) => days.push(day),
                Err(e) => return AttemptOutcome::Failed(e),
            }
        }

        if days.is_empty() {
            return AttemptOutcome::NoValidDays;
        }

        if trip_type == TripType::Bike {
            let over_day_cap = days
                .iter()
                .any(|d| d.distance_km > constraints.bike_max_per_day_km);
            let total_km: f64 = days.iter().map(|d| d.distance_km).sum();
            let limit_km = constraints.bike_effective_limit_km(day_count);

            if over_day_cap || total_km > limit_km {
                return AttemptOutcome::LimitsExceeded {
                    over_day_cap,
                    total_km,
                    limit_km,
                };
            }
        }

        AttemptOutcome::Accepted(Plan {
            trip_type,
            country: country.to_string(),
            days,
        })
    }

    async fn build_day(&self, job: &DayJob<'_>, search: &LoopSearch) -> Result<Day> {
        match *job {
            DayJob::Walk { day, target } => {
                self.day_builder.build_walking_loop(day, target, search).await
            }
            DayJob::Ride { day, from, to } => {
                self.day_builder.build_biking_day(day, from, to).await
            }
        }
    }
}

/// Apply the skip rules and resolve day indices.
///
/// Hike entries need a target with valid coordinates. Bike entries need both
/// endpoints; their coordinates are checked when the day is built. An entry
/// without a usable `day` number takes the next position after the entries
/// kept so far.
fn plan_jobs(seeds: &[DaySeed]) -> Vec<DayJob<'_>> {
    let mut jobs = Vec::with_capacity(seeds.len());

    for seed in seeds {
        let day = seed.day().unwrap_or(jobs.len() as u32 + 1);
        match seed {
            DaySeed::Hike {
                target: Some(target),
                ..
            } if target.has_valid_coordinates() => jobs.push(DayJob::Walk { day, target }),
            DaySeed::Bike {
                from: Some(from),
                to: Some(to),
                ..
            } => jobs.push(DayJob::Ride { day, from, to }),
            _ => {}
        }
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Coordinates, RouteResult, TransportMode};
    use crate::services::day_builder::{LoopCandidate, LoopSampler};
    use crate::services::llm::{CompletionClient, CompletionRequest};
    use crate::services::routing::{ProfileChain, RoutingBackend, RoutingClient};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replies from a script; the last reply repeats once the script runs out.
    struct ScriptedLlm {
        replies: Mutex<VecDeque<Result<String>>>,
        last: String,
        calls: AtomicUsize,
    }

    impl ScriptedLlm {
        fn repeating(reply: &str) -> Arc<Self> {
            Self::scripted(vec![], reply)
        }

        fn scripted(replies: Vec<Result<String>>, then: &str) -> Arc<Self> {
            Arc::new(ScriptedLlm {
                replies: Mutex::new(replies.into()),
                last: then.to_string(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CompletionClient for ScriptedLlm {
        async fn complete(&self, _request: CompletionRequest) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.replies.lock().unwrap().pop_front() {
                Some(reply) => reply,
                None => Ok(self.last.clone()),
            }
        }
    }

    /// Snaps in place and reports a fixed length for every route
    struct FixedLengthBackend {
        distance_meters: f64,
        calls: AtomicUsize,
    }

    impl FixedLengthBackend {
        fn new(distance_meters: f64) -> Arc<Self> {
            Arc::new(FixedLengthBackend {
                distance_meters,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RoutingBackend for FixedLengthBackend {
        async fn nearest(&self, _profile: &str, coord: Coordinates) -> Result<Coordinates> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(coord)
        }

        async fn route(&self, _profile: &str, waypoints: &[Coordinates]) -> Result<RouteResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouteResult {
                distance_meters: self.distance_meters,
                duration_seconds: self.distance_meters / 4.0,
                geometry: waypoints.to_vec(),
            })
        }
    }

    struct EastSampler;

    impl LoopSampler for EastSampler {
        fn next_candidate(&self) -> LoopCandidate {
            LoopCandidate {
                radius_meters: 2_000.0,
                bearing_degrees: 90.0,
            }
        }
    }

    fn planner(llm: Arc<ScriptedLlm>, backend: Arc<FixedLengthBackend>) -> Planner {
        Planner::new(
            SeedGenerator::new(llm, 0.25),
            DayBuilder::new(
                RoutingClient::new(backend),
                ProfileChain::single("foot"),
                ProfileChain::single("bike"),
                Arc::new(EastSampler),
            ),
        )
    }

    const EIFFEL_SEED: &str =
        r#"{"days":[{"day":1,"target":{"name":"Eiffel Tower","lat":48.8584,"lon":2.2945}}]}"#;

    const TWO_DAY_BIKE_SEED: &str = r#"{"days":[
        {"day":1,"from":{"name":"Paris","lat":48.8566,"lon":2.3522},"to":{"name":"Chartres","lat":48.4439,"lon":1.4890}},
        {"day":2,"from":{"name":"Chartres","lat":48.4439,"lon":1.4890},"to":{"name":"Orleans","lat":47.9029,"lon":1.9093}}
    ]}"#;

    #[tokio::test]
    async fn test_walking_plan_single_loop_day() {
        let llm = ScriptedLlm::repeating(EIFFEL_SEED);
        let backend = FixedLengthBackend::new(9_500.0);

        let plan = planner(llm.clone(), backend)
            .plan_trip("France", "hiking", 1, &Constraints::default())
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(plan.trip_type, TripType::Hike);
        assert_eq!(plan.days.len(), 1);
        let day = &plan.days[0];
        assert_eq!(day.profile, TransportMode::Walk);
        assert_eq!(day.waypoints.len(), 3);
        assert_eq!(day.waypoints[1].name, "Eiffel Tower");
        assert!((5.0..=15.0).contains(&day.distance_km));
    }

    #[tokio::test]
    async fn test_empty_country_fails_without_calls() {
        let llm = ScriptedLlm::repeating(EIFFEL_SEED);
        let backend = FixedLengthBackend::new(9_500.0);

        let err = planner(llm.clone(), backend.clone())
            .plan_trip("", "hiking", 1, &Constraints::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(llm.calls(), 0);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_trip_type_fails_without_calls() {
        let llm = ScriptedLlm::repeating(EIFFEL_SEED);
        let backend = FixedLengthBackend::new(9_500.0);

        let err = planner(llm.clone(), backend)
            .plan_trip("France", "  ", 1, &Constraints::default())
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_bike_limits_exceeded_after_every_attempt() {
        // 70km per day against a 60km cap
        let llm = ScriptedLlm::repeating(TWO_DAY_BIKE_SEED);
        let backend = FixedLengthBackend::new(70_000.0);

        let err = planner(llm.clone(), backend)
            .plan_trip("France", "biking", 2, &Constraints::default())
            .await
            .unwrap_err();

        assert_eq!(
            err.planning_failure(),
            Some(PlanningFailure::BikeDistanceLimitsExceeded)
        );
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_bike_plan_within_limits() {
        let llm = ScriptedLlm::repeating(TWO_DAY_BIKE_SEED);
        let backend = FixedLengthBackend::new(55_000.0);

        let plan = planner(llm.clone(), backend)
            .plan_trip("France", "biking", 2, &Constraints::default())
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert_eq!(plan.days.len(), 2);
        assert_eq!(plan.days[0].waypoints[0].name, "Paris");
        assert_eq!(plan.days[1].waypoints[1].name, "Orleans");
        assert!(plan.days.iter().all(|d| d.distance_km <= 60.0));
        assert!(plan.total_distance_km() <= 120.0);
    }

    #[tokio::test]
    async fn test_single_bike_day_uses_per_day_cap_as_total() {
        let constraints = Constraints {
            bike_max_per_day_km: 80.0,
            bike_total_max_km: 50.0,
            ..Constraints::default()
        };
        let seed = r#"{"days":[{"day":1,"from":{"name":"Paris","lat":48.8566,"lon":2.3522},"to":{"name":"Chartres","lat":48.4439,"lon":1.4890}}]}"#;
        let llm = ScriptedLlm::repeating(seed);
        let backend = FixedLengthBackend::new(70_000.0);

        // A 70km single day is above the total cap but the total cap only
        // applies to multi-day trips.
        let plan = planner(llm, backend)
            .plan_trip("France", "biking", 1, &constraints)
            .await
            .unwrap();

        assert_eq!(plan.days[0].distance_km, 70.0);
    }

    #[tokio::test]
    async fn test_no_valid_days_after_every_attempt() {
        let llm = ScriptedLlm::repeating(
            r#"{"days":[{"day":1,"target":{"name":"Atlantis","lat":"n/a","lon":2.0}},{"day":2}]}"#,
        );
        let backend = FixedLengthBackend::new(9_500.0);

        let err = planner(llm.clone(), backend.clone())
            .plan_trip("France", "walking", 2, &Constraints::default())
            .await
            .unwrap_err();

        assert_eq!(err.planning_failure(), Some(PlanningFailure::NoValidDays));
        assert_eq!(llm.calls(), 4);
        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_format_error_triggers_replan() {
        let llm = ScriptedLlm::scripted(
            vec![
                Ok("Here is a lovely plan!".to_string()),
                Err(AppError::AiService("HTTP 503".to_string())),
            ],
            EIFFEL_SEED,
        );
        let backend = FixedLengthBackend::new(9_500.0);

        let plan = planner(llm.clone(), backend)
            .plan_trip("France", "hike", 1, &Constraints::default())
            .await
            .unwrap();

        assert_eq!(llm.calls(), 3);
        assert_eq!(plan.days.len(), 1);
    }

    #[tokio::test]
    async fn test_repeated_failures_end_as_planning_failed() {
        let llm = ScriptedLlm::repeating("not json");
        let backend = FixedLengthBackend::new(9_500.0);

        let err = planner(llm.clone(), backend)
            .plan_trip("France", "hike", 1, &Constraints::default())
            .await
            .unwrap_err();

        assert_eq!(err.planning_failure(), Some(PlanningFailure::PlanningFailed));
        assert_eq!(llm.calls(), 4);
    }

    #[tokio::test]
    async fn test_day_count_is_clamped() {
        let llm = ScriptedLlm::repeating(EIFFEL_SEED);
        let backend = FixedLengthBackend::new(9_500.0);

        planner(llm.clone(), backend)
            .plan_trip("France", "hike", 9, &Constraints::default())
            .await
            .unwrap();

        // Nothing above two days is ever requested
        assert_eq!(llm.calls(), 1);
    }

    #[tokio::test]
    async fn test_deadline_exceeded() {
        struct SlowLlm;

        #[async_trait]
        impl CompletionClient for SlowLlm {
            async fn complete(&self, _request: CompletionRequest) -> Result<String> {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(EIFFEL_SEED.to_string())
            }
        }

        let planner = Planner::new(
            SeedGenerator::new(Arc::new(SlowLlm), 0.25),
            DayBuilder::new(
                RoutingClient::new(FixedLengthBackend::new(9_500.0)),
                ProfileChain::single("foot"),
                ProfileChain::single("bike"),
                Arc::new(EastSampler),
            ),
        );

        let err = planner
            .plan_trip_with_deadline(
                "France",
                "hike",
                1,
                &Constraints::default(),
                Duration::from_millis(50),
            )
            .await
            .unwrap_err();

        assert_eq!(err.planning_failure(), Some(PlanningFailure::DeadlineExceeded));
    }

    #[test]
    fn test_plan_jobs_skip_rules_and_day_fallback() {
        let seeds = vec![
            DaySeed::Hike {
                day: None,
                target: Some(SeedPoint::new("Bad", f64::NAN, 2.0)),
            },
            DaySeed::Hike {
                day: None,
                target: Some(SeedPoint::new("Louvre", 48.8606, 2.3376)),
            },
            DaySeed::Hike {
                day: Some(5),
                target: Some(SeedPoint::new("Orsay", 48.86, 2.3266)),
            },
            DaySeed::Bike {
                day: Some(1),
                from: Some(SeedPoint::new("Paris", 48.85, 2.35)),
                to: None,
            },
            DaySeed::Bike {
                day: None,
                from: Some(SeedPoint::new("Paris", 48.85, 2.35)),
                to: Some(SeedPoint::new("Nowhere", 95.0, 2.0)),
            },
        ];

        let jobs = plan_jobs(&seeds);
        let days: Vec<u32> = jobs
            .iter()
            .map(|job| match job {
                DayJob::Walk { day, .. } | DayJob::Ride { day, .. } => *day,
            })
            .collect();

        // Invalid bike coordinates are kept so the build reports them
        assert_eq!(days, vec![1, 5, 3]);
    }
}
