use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{DaySeed, SeedPoint, TripType};
use crate::services::llm::{CompletionClient, CompletionRequest};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

const SYSTEM_PROMPT: &str = "You are a precise trip planner. Return STRICT JSON only, a single \
JSON object with no extra text. Use well-known, routable places inside the specified country. \
For walking, choose diverse, named urban points of interest (museums, galleries, markets, food \
halls, historic squares, old city gates and clock towers, libraries, universities, city halls, \
theaters and opera houses, cultural centers, religious sites, monuments and memorials, landmark \
bridges, viewpoints, waterfront promenades, central stations, stadiums, aquariums and zoos, \
botanical gardens, covered arcades, street-art alleys, notable streets and neighborhoods), not \
only parks or nature spots. All coordinates must be plausible decimal lat/lon inside the country.";

/// Distance caps forwarded to the prompt for biking trips
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BikeCaps {
    pub max_per_day_km: f64,
    /// Only set for multi-day trips
    pub total_max_km: Option<f64>,
}

impl BikeCaps {
    /// Per-day band the service is asked to aim for, in whole kilometers
    pub fn band_km(&self) -> (f64, f64) {
        let lower = (self.max_per_day_km * BIKE_BAND_LOWER_FRACTION)
            .floor()
            .max(BIKE_BAND_LOWER_FLOOR_KM);
        (lower, self.max_per_day_km)
    }
}

/// Asks the AI completion service for an itinerary skeleton.
#[derive(Clone)]
pub struct SeedGenerator {
    llm: Arc<dyn CompletionClient>,
    temperature: f64,
}

impl SeedGenerator {
    pub fn new(llm: Arc<dyn CompletionClient>, temperature: f64) -> Self {
        SeedGenerator { llm, temperature }
    }

    /// One completion request; the reply must be a single JSON object.
    /// Entries are returned unvalidated, coordinate checks belong to the caller.
    #[instrument(skip(self, caps))]
    pub async fn request_seed(
        &self,
        country: &str,
        trip_type: TripType,
        day_count: u32,
        caps: Option<BikeCaps>,
    ) -> Result<Vec<DaySeed>> {
        let user_prompt = match trip_type {
            TripType::Hike => walking_prompt(country, day_count),
            TripType::Bike => biking_prompt(
                country,
                day_count,
                caps.unwrap_or(BikeCaps {
                    max_per_day_km: DEFAULT_BIKE_MAX_PER_DAY_KM,
                    total_max_km: None,
                }),
            ),
        };

        let request = CompletionRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_prompt,
            temperature: self.temperature,
            json_object: true,
        };

        let raw = self.llm.complete(request).await?;
        let seeds = parse_seed(&raw, trip_type)?;

        tracing::info!(
            entries = seeds.len(),
            "Seed service returned {} day entries for {}",
            seeds.len(),
            country
        );

        Ok(seeds)
    }
}

fn walking_prompt(country: &str, day_count: u32) -> String {
    let mut days = String::from(
        r#"{"day":1,"target":{"name":"<famous landmark or building>","lat":..,"lon":..}}"#,
    );
    if day_count > 1 {
        days.push_str(r#",{"day":2,"target":{"name":"<a different landmark>","lat":..,"lon":..}}"#);
    }

    format!(
        "Country: {country}\n\
         Trip type: walking loops\n\
         Days: {day_count}\n\
         Pick {day_count} distinct, well-known, routable urban points of interest from \
         different categories.\n\
         Return JSON ONLY:\n\
         {{\"tripType\":\"hike\",\"country\":\"{country}\",\"days\":[{days}]}}\n"
    )
}

fn biking_prompt(country: &str, day_count: u32, caps: BikeCaps) -> String {
    let (lower, upper) = caps.band_km();
    let total = match caps.total_max_km {
        Some(total) if day_count > 1 => format!("Total across days should be <= {} km. ", total),
        _ => String::new(),
    };

    let mut days = String::from(
        r#"{"day":1,"from":{"name":"<city>","lat":..,"lon":..},"to":{"name":"<city>","lat":..,"lon":..}}"#,
    );
    if day_count > 1 {
        days.push_str(
            r#",{"day":2,"from":{"name":"<city>","lat":..,"lon":..},"to":{"name":"<city>","lat":..,"lon":..}}"#,
        );
    }

    format!(
        "Country: {country}\n\
         Trip type: biking city-to-city\n\
         Days: {day_count}\n\
         Constraint: choose pairs of cities where the bicycle road distance is ~{lower}-{upper} km per day. \
         {total}Avoid border crossings. Return JSON ONLY:\n\
         {{\"tripType\":\"bike\",\"country\":\"{country}\",\"days\":[{days}]}}\n"
    )
}

// Raw reply shape. Everything is optional so that partial entries reach the
// caller, which decides what to skip.

#[derive(Debug, Deserialize)]
struct RawSeed {
    #[serde(default)]
    days: Option<Vec<RawSeedDay>>,
}

#[derive(Debug, Deserialize)]
struct RawSeedDay {
    #[serde(default)]
    day: Option<Value>,
    #[serde(default)]
    target: Option<RawSeedPoint>,
    #[serde(default)]
    from: Option<RawSeedPoint>,
    #[serde(default)]
    to: Option<RawSeedPoint>,
}

#[derive(Debug, Deserialize)]
struct RawSeedPoint {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    lat: Option<Value>,
    #[serde(default, alias = "lng")]
    lon: Option<Value>,
}

impl RawSeedPoint {
    fn into_seed_point(self) -> SeedPoint {
        SeedPoint::new(
            self.name.unwrap_or_else(|| "Unnamed place".to_string()),
            number_or_nan(self.lat.as_ref()),
            number_or_nan(self.lon.as_ref()),
        )
    }
}

/// Only JSON numbers count as coordinates
fn number_or_nan(value: Option<&Value>) -> f64 {
    value.and_then(Value::as_f64).unwrap_or(f64::NAN)
}

fn parse_day_index(value: Option<&Value>) -> Option<u32> {
    let index = match value? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }?;
    u32::try_from(index).ok().filter(|i| *i > 0)
}

/// Strict JSON parse of a seed reply
pub(crate) fn parse_seed(raw: &str, trip_type: TripType) -> Result<Vec<DaySeed>> {
    let text = if raw.trim().is_empty() { "{}" } else { raw.trim() };
    let parsed: RawSeed = serde_json::from_str(text).map_err(|e| {
        tracing::warn!(error = %e, "Seed reply is not the expected JSON object");
        AppError::AiFormat(format!("Seed service returned non-JSON: {}", e))
    })?;

    Ok(parsed
        .days
        .unwrap_or_default()
        .into_iter()
        .map(|entry| {
            let day = parse_day_index(entry.day.as_ref());
            match trip_type {
                TripType::Hike => DaySeed::Hike {
                    day,
                    target: entry.target.map(RawSeedPoint::into_seed_point),
                },
                TripType::Bike => DaySeed::Bike {
                    day,
                    from: entry.from.map(RawSeedPoint::into_seed_point),
                    to: entry.to.map(RawSeedPoint::into_seed_point),
                },
            }
        })
        .collect())
}
