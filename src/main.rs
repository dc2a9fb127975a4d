use axum::Router;
use easytrip::config::Config;
use easytrip::services::day_builder::{DayBuilder, RandomLoopSampler};
use easytrip::services::llm::GroqClient;
use easytrip::services::osrm::OsrmClient;
use easytrip::services::planner::Planner;
use easytrip::services::routing::{ProfileChain, RoutingClient};
use easytrip::services::seed_generator::SeedGenerator;
use easytrip::services::waypoint_snapper::WaypointSnapper;
use easytrip::AppState;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "easytrip=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;

    tracing::info!("Starting EasyTrip API server");
    tracing::info!(
        routing = %config.osrm_base_url,
        model = %config.groq_model,
        "Configuration loaded successfully"
    );

    // Initialize services
    let osrm_client = OsrmClient::with_timeouts(
        config.osrm_base_url.clone(),
        Duration::from_secs(config.osrm_nearest_timeout_secs),
        Duration::from_secs(config.osrm_route_timeout_secs),
    );
    let routing = RoutingClient::new(Arc::new(osrm_client));

    let groq_client = GroqClient::with_config(
        config.groq_api_key.clone(),
        config.groq_base_url.clone(),
        config.groq_model.clone(),
        Duration::from_secs(config.llm_timeout_secs),
    );
    let seed_generator =
        SeedGenerator::new(Arc::new(groq_client), config.planner.llm_temperature);

    let day_builder = DayBuilder::new(
        routing.clone(),
        ProfileChain::walking(&config.osrm_profile_walk),
        ProfileChain::biking(&config.osrm_profile_bike),
        Arc::new(RandomLoopSampler::new()),
    );

    // Create application state
    let state = Arc::new(AppState {
        planner: Planner::new(seed_generator, day_builder),
        snapper: WaypointSnapper::new(routing),
        planner_config: config.planner.clone(),
        plan_deadline: config.plan_deadline(),
        routing_base_url: config.osrm_base_url.clone(),
        llm_model: config.groq_model.clone(),
        llm_key_configured: !config.groq_api_key.trim().is_empty(),
    });

    // Build router with CORS and tracing
    let app = Router::new()
        .nest("/api/v1", easytrip::routes::create_router(state))
        .fallback(easytrip::routes::not_found)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
