use crate::constants::*;
use crate::error::{AppError, Result};
use crate::models::{Coordinates, RouteResult};
use async_trait::async_trait;
use std::sync::Arc;

/// A routing service that answers for one profile at a time.
#[async_trait]
pub trait RoutingBackend: Send + Sync {
    async fn nearest(&self, profile: &str, coord: Coordinates) -> Result<Coordinates>;
    async fn route(&self, profile: &str, waypoints: &[Coordinates]) -> Result<RouteResult>;
}

/// Ordered list of routing profiles, preferred first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileChain(Vec<String>);

impl ProfileChain {
    /// Build a chain from arbitrary profiles. Duplicates keep their first position.
    pub fn new<I, S>(profiles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut chain: Vec<String> = Vec::new();
        for profile in profiles {
            let profile = profile.into();
            if !profile.is_empty() && !chain.contains(&profile) {
                chain.push(profile);
            }
        }
        ProfileChain(chain)
    }

    pub fn single(profile: impl Into<String>) -> Self {
        Self::new([profile.into()])
    }

    /// `preferred` followed by the generic walking synonyms
    pub fn walking(preferred: &str) -> Self {
        Self::new(
            std::iter::once(preferred.to_string())
                .chain(WALK_PROFILE_SYNONYMS.iter().map(|s| s.to_string())),
        )
    }

    /// `preferred` followed by the generic biking synonyms
    pub fn biking(preferred: &str) -> Self {
        Self::new(
            std::iter::once(preferred.to_string())
                .chain(BIKE_PROFILE_SYNONYMS.iter().map(|s| s.to_string())),
        )
    }

    pub fn profiles(&self) -> &[String] {
        &self.0
    }
}

/// Runs nearest/route requests across a profile chain, returning the first
/// profile that answers.
#[derive(Clone)]
pub struct RoutingClient {
    backend: Arc<dyn RoutingBackend>,
}

impl RoutingClient {
    pub fn new(backend: Arc<dyn RoutingBackend>) -> Self {
        RoutingClient { backend }
    }

    pub async fn nearest(&self, chain: &ProfileChain, coord: Coordinates) -> Result<Coordinates> {
        let mut failures: Vec<(String, AppError)> = Vec::new();

        for profile in chain.profiles() {
            match self.backend.nearest(profile, coord).await {
                Ok(snapped) => {
                    if !failures.is_empty() {
                        tracing::debug!(
                            profile = %profile,
                            skipped = failures.len(),
                            "Nearest succeeded on fallback profile {}",
                            profile
                        );
                    }
                    return Ok(snapped);
                }
                Err(e) => failures.push((profile.clone(), e)),
            }
        }

        Err(Self::exhausted("nearest", chain, failures))
    }

    pub async fn route(&self, chain: &ProfileChain, waypoints: &[Coordinates]) -> Result<RouteResult> {
        if waypoints.len() < 2 {
            return Err(AppError::InvalidInput(
                "At least 2 waypoints required".to_string(),
            ));
        }

        let mut failures: Vec<(String, AppError)> = Vec::new();

        for profile in chain.profiles() {
            match self.backend.route(profile, waypoints).await {
                Ok(route) => {
                    if !failures.is_empty() {
                        tracing::debug!(
                            profile = %profile,
                            skipped = failures.len(),
                            "Route succeeded on fallback profile {}",
                            profile
                        );
                    }
                    return Ok(route);
                }
                Err(e) => failures.push((profile.clone(), e)),
            }
        }

        Err(Self::exhausted("route", chain, failures))
    }

    /// Every profile failed: surface the last underlying error
    fn exhausted(
        operation: &str,
        chain: &ProfileChain,
        mut failures: Vec<(String, AppError)>,
    ) -> AppError {
        match failures.pop() {
            Some((profile, last)) => {
                tracing::warn!(
                    operation = operation,
                    profiles = ?chain.profiles(),
                    "All {} profiles failed for {}, last ({}): {}",
                    chain.profiles().len(), operation, profile, last
                );
                match last {
                    AppError::Routing(message) => AppError::Routing(message),
                    other => AppError::Routing(other.to_string()),
                }
            }
            None => AppError::Routing(format!("No routing profiles configured for {}", operation)),
        }
    }
}
