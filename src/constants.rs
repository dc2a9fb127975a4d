//! Stable application-wide constants.
//!
//! Values here are structural invariants, algorithm coefficients, and default
//! fallbacks for env-var-based configuration. They should rarely change.
//! Per-request distance caps and retry budgets live in
//! [`PlannerConfig`](crate::config::PlannerConfig) instead.

// --- Server defaults (used when HOST / PORT env vars are absent) ---

/// Default bind address for the HTTP server.
pub const DEFAULT_HOST: &str = "0.0.0.0";
/// Default port for the HTTP server.
pub const DEFAULT_PORT: &str = "3000";

// --- External services ---

/// Public OSRM demo server.
pub const DEFAULT_OSRM_BASE_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_OSRM_PROFILE_WALK: &str = "foot";
pub const DEFAULT_OSRM_PROFILE_BIKE: &str = "bike";
/// Generic synonyms tried after the preferred walking profile.
pub const WALK_PROFILE_SYNONYMS: [&str; 2] = ["walking", "foot"];
/// Generic synonyms tried after the preferred biking profile.
pub const BIKE_PROFILE_SYNONYMS: [&str; 2] = ["cycling", "bike"];
pub const DEFAULT_NEAREST_TIMEOUT_SECONDS: u64 = 15;
pub const DEFAULT_ROUTE_TIMEOUT_SECONDS: u64 = 30;

pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_LLM_TIMEOUT_SECONDS: u64 = 30;
/// Low, fixed sampling temperature so seeds are reproducible.
pub const DEFAULT_LLM_TEMPERATURE: f64 = 0.25;

/// Overall deadline for one planning request.
pub const DEFAULT_PLAN_DEADLINE_SECONDS: u64 = 120;

// --- Planning defaults ---

pub const DEFAULT_WALKING_MIN_KM: f64 = 5.0;
pub const DEFAULT_WALKING_MAX_KM: f64 = 15.0;
pub const DEFAULT_BIKE_MAX_PER_DAY_KM: f64 = 60.0;
pub const DEFAULT_BIKE_TOTAL_MAX_KM: f64 = 120.0;
pub const DEFAULT_MAX_LOOP_TRIES: usize = 10;
pub const DEFAULT_MAX_REPLANS: usize = 4;
/// Day count used when a request omits `limits.maxDays`.
pub const DEFAULT_MAX_DAYS: u32 = 2;
pub const MIN_TRIP_DAYS: u32 = 1;
pub const MAX_TRIP_DAYS: u32 = 2;

// --- Walking loop search ---
// Each try places a loop start at a random radius and bearing from the target,
// then routes start -> target -> start.

pub const LOOP_START_MIN_RADIUS_METERS: f64 = 1_500.0;
pub const LOOP_START_MAX_RADIUS_METERS: f64 = 6_000.0;

// --- Biking prompt band ---

/// Lower edge of the requested per-day band as a fraction of the per-day cap.
pub const BIKE_BAND_LOWER_FRACTION: f64 = 0.8;
/// The lower edge never drops below this many kilometers.
pub const BIKE_BAND_LOWER_FLOOR_KM: f64 = 30.0;

// --- Snapping ---

/// First and last snapped points closer than this are already a closed loop.
pub const LOOP_CLOSURE_TOLERANCE_KM: f64 = 0.03;

// --- Geodesy ---

pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;
