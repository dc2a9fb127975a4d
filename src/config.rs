use crate::constants::*;
use crate::models::Constraints;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub osrm_base_url: String,
    pub osrm_profile_walk: String,
    pub osrm_profile_bike: String,
    pub osrm_nearest_timeout_secs: u64,
    pub osrm_route_timeout_secs: u64,
    pub groq_api_key: String,
    pub groq_base_url: String,
    pub groq_model: String,
    pub llm_timeout_secs: u64,
    pub plan_deadline_secs: u64,
    pub planner: PlannerConfig,
}

/// Default limits and retry budgets for planning requests
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Walking loop band (km)
    pub walking_min_km: f64,
    pub walking_max_km: f64,

    /// Cap on any single biking day (km)
    pub bike_max_per_day_km: f64,

    /// Cap on the sum of all biking days, multi-day trips only (km)
    pub bike_total_max_km: f64,

    /// Loop candidates tried per walking day
    pub max_loop_tries: usize,

    /// Seed-and-build attempts per planning request
    pub max_replans: usize,

    /// Day count used when a request does not ask for one
    pub default_max_days: u32,

    pub llm_temperature: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            walking_min_km: DEFAULT_WALKING_MIN_KM,
            walking_max_km: DEFAULT_WALKING_MAX_KM,
            bike_max_per_day_km: DEFAULT_BIKE_MAX_PER_DAY_KM,
            bike_total_max_km: DEFAULT_BIKE_TOTAL_MAX_KM,
            max_loop_tries: DEFAULT_MAX_LOOP_TRIES,
            max_replans: DEFAULT_MAX_REPLANS,
            default_max_days: DEFAULT_MAX_DAYS,
            llm_temperature: DEFAULT_LLM_TEMPERATURE,
        }
    }
}

impl PlannerConfig {
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            walking_min_km: env::var("PLAN_WALKING_MIN_KM")
                .unwrap_or_else(|_| defaults.walking_min_km.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_WALKING_MIN_KM")?,

            walking_max_km: env::var("PLAN_WALKING_MAX_KM")
                .unwrap_or_else(|_| defaults.walking_max_km.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_WALKING_MAX_KM")?,

            bike_max_per_day_km: env::var("PLAN_BIKE_MAX_PER_DAY_KM")
                .unwrap_or_else(|_| defaults.bike_max_per_day_km.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_BIKE_MAX_PER_DAY_KM")?,

            bike_total_max_km: env::var("PLAN_BIKE_TOTAL_MAX_KM")
                .unwrap_or_else(|_| defaults.bike_total_max_km.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_BIKE_TOTAL_MAX_KM")?,

            max_loop_tries: env::var("PLAN_MAX_LOOP_TRIES")
                .unwrap_or_else(|_| defaults.max_loop_tries.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_MAX_LOOP_TRIES")?,

            max_replans: env::var("PLAN_MAX_REPLANS")
                .unwrap_or_else(|_| defaults.max_replans.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_MAX_REPLANS")?,

            default_max_days: env::var("PLAN_DEFAULT_MAX_DAYS")
                .unwrap_or_else(|_| defaults.default_max_days.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_DEFAULT_MAX_DAYS")?,

            llm_temperature: env::var("PLAN_LLM_TEMPERATURE")
                .unwrap_or_else(|_| defaults.llm_temperature.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_LLM_TEMPERATURE")?,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.walking_min_km <= 0.0 || self.walking_min_km > self.walking_max_km {
            return Err(
                "PLAN_WALKING_MIN_KM must be positive and not above PLAN_WALKING_MAX_KM".to_string(),
            );
        }
        if self.bike_max_per_day_km <= 0.0 || self.bike_total_max_km <= 0.0 {
            return Err("Biking distance caps must be positive".to_string());
        }
        if self.max_loop_tries == 0 || self.max_replans == 0 {
            return Err("PLAN_MAX_LOOP_TRIES and PLAN_MAX_REPLANS must be at least 1".to_string());
        }
        if !(0.0..=2.0).contains(&self.llm_temperature) {
            return Err("PLAN_LLM_TEMPERATURE must be between 0 and 2".to_string());
        }
        Ok(())
    }

    /// Constraints applied when a request does not override them
    pub fn constraints(&self) -> Constraints {
        Constraints {
            walking_min_km: self.walking_min_km,
            walking_max_km: self.walking_max_km,
            bike_max_per_day_km: self.bike_max_per_day_km,
            bike_total_max_km: self.bike_total_max_km,
            max_loop_tries: self.max_loop_tries,
            max_replans: self.max_replans,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            osrm_base_url: env::var("OSRM_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OSRM_BASE_URL.to_string()),
            osrm_profile_walk: env::var("OSRM_PROFILE_WALK")
                .unwrap_or_else(|_| DEFAULT_OSRM_PROFILE_WALK.to_string()),
            osrm_profile_bike: env::var("OSRM_PROFILE_BIKE")
                .unwrap_or_else(|_| DEFAULT_OSRM_PROFILE_BIKE.to_string()),
            osrm_nearest_timeout_secs: env::var("OSRM_NEAREST_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_NEAREST_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid OSRM_NEAREST_TIMEOUT_SECS")?,
            osrm_route_timeout_secs: env::var("OSRM_ROUTE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_ROUTE_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid OSRM_ROUTE_TIMEOUT_SECS")?,
            groq_api_key: env::var("GROQ_API_KEY").map_err(|_| "GROQ_API_KEY must be set")?,
            groq_base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string()),
            groq_model: env::var("GROQ_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            llm_timeout_secs: env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_LLM_TIMEOUT_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid LLM_TIMEOUT_SECS")?,
            plan_deadline_secs: env::var("PLAN_DEADLINE_SECS")
                .unwrap_or_else(|_| DEFAULT_PLAN_DEADLINE_SECONDS.to_string())
                .parse()
                .map_err(|_| "Invalid PLAN_DEADLINE_SECS")?,
            planner: PlannerConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn plan_deadline(&self) -> Duration {
        Duration::from_secs(self.plan_deadline_secs)
    }
}
