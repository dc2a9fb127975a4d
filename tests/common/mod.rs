use async_trait::async_trait;
use easytrip::config::PlannerConfig;
use easytrip::models::{Coordinates, RouteResult};
use easytrip::services::day_builder::{DayBuilder, LoopCandidate, LoopSampler};
use easytrip::services::llm::{CompletionClient, CompletionRequest};
use easytrip::services::planner::Planner;
use easytrip::services::routing::{ProfileChain, RoutingBackend, RoutingClient};
use easytrip::services::seed_generator::SeedGenerator;
use easytrip::services::waypoint_snapper::WaypointSnapper;
use easytrip::{AppError, AppState, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[allow(dead_code)]
pub const EIFFEL_SEED: &str =
    r#"{"tripType":"hike","country":"France","days":[{"day":1,"target":{"name":"Eiffel Tower","lat":48.8584,"lon":2.2945}}]}"#;

#[allow(dead_code)]
pub const BIKE_SEED: &str = r#"{"tripType":"bike","country":"France","days":[
    {"day":1,"from":{"name":"Paris","lat":48.8566,"lon":2.3522},"to":{"name":"Chartres","lat":48.4439,"lon":1.4890}},
    {"day":2,"from":{"name":"Chartres","lat":48.4439,"lon":1.4890},"to":{"name":"Orleans","lat":47.9029,"lon":1.9093}}
]}"#;

/// Completion client that always returns the same reply
pub struct FakeLlm {
    reply: String,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeLlm {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(FakeLlm {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for FakeLlm {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(request.user_prompt);
        Ok(self.reply.clone())
    }
}

/// Routing backend with per-profile route lengths. Unknown profiles fail,
/// nearest returns the input unchanged.
pub struct FakeRouting {
    walk_meters: f64,
    bike_meters: f64,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeRouting {
    pub fn new(walk_meters: f64, bike_meters: f64) -> Arc<Self> {
        Arc::new(FakeRouting {
            walk_meters,
            bike_meters,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn distance_for(&self, profile: &str) -> Option<f64> {
        match profile {
            "foot" | "walking" => Some(self.walk_meters),
            "bike" | "cycling" => Some(self.bike_meters),
            _ => None,
        }
    }
}

#[async_trait]
impl RoutingBackend for FakeRouting {
    async fn nearest(&self, profile: &str, coord: Coordinates) -> Result<Coordinates> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.distance_for(profile) {
            Some(_) => Ok(coord),
            None => Err(AppError::Routing(format!("OSRM nearest failed ({})", profile))),
        }
    }

    async fn route(&self, profile: &str, waypoints: &[Coordinates]) -> Result<RouteResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.distance_for(profile) {
            Some(distance_meters) => Ok(RouteResult {
                distance_meters,
                duration_seconds: distance_meters * 0.72,
                geometry: waypoints.to_vec(),
            }),
            None => Err(AppError::Routing(format!("OSRM route failed ({})", profile))),
        }
    }
}

/// Always proposes the same loop start
pub struct FixedSampler;

impl LoopSampler for FixedSampler {
    fn next_candidate(&self) -> LoopCandidate {
        LoopCandidate {
            radius_meters: 2_500.0,
            bearing_degrees: 45.0,
        }
    }
}

#[allow(dead_code)]
pub fn build_planner(llm: Arc<FakeLlm>, routing: Arc<FakeRouting>) -> Planner {
    Planner::new(
        SeedGenerator::new(llm, 0.25),
        DayBuilder::new(
            RoutingClient::new(routing),
            ProfileChain::walking("foot"),
            ProfileChain::biking("bike"),
            Arc::new(FixedSampler),
        ),
    )
}

/// Router wired to in-process fakes
#[allow(dead_code)]
pub fn test_app(llm: Arc<FakeLlm>, routing: Arc<FakeRouting>) -> axum::Router {
    let state = Arc::new(AppState {
        planner: build_planner(llm, routing.clone()),
        snapper: WaypointSnapper::new(RoutingClient::new(routing)),
        planner_config: PlannerConfig::default(),
        plan_deadline: Duration::from_secs(10),
        routing_base_url: "http://osrm.test".to_string(),
        llm_model: "fake-model".to_string(),
        llm_key_configured: true,
    });

    easytrip::routes::create_router(state)
}
