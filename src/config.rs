//! Application configuration loaded from environment variables.
//!
//! A `.env` file is honoured for local runs. Every value has a default, so
//! an empty environment yields a working configuration.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default strict radius for reward qualification (miles).
pub const DEFAULT_PROXIMITY_BUFFER_MILES: f64 = 10.0;
/// Default coarse radius for "nearby" display (miles).
pub const DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES: f64 = 200.0;
/// Number of attractions returned by a nearest-attractions query.
pub const DEFAULT_NEARBY_ATTRACTIONS_COUNT: usize = 5;
/// Units in flight per batch. Units spend almost all their time waiting on
/// the position and reward sources, so this is sized for I/O, not cores.
pub const DEFAULT_BATCH_CONCURRENCY: usize = 1000;
/// Tracking 100,000 users must complete within 15 minutes.
pub const DEFAULT_TRACK_BUDGET: Duration = Duration::from_secs(15 * 60);
/// Computing rewards for 100,000 users must complete within 20 minutes.
pub const DEFAULT_REWARDS_BUDGET: Duration = Duration::from_secs(20 * 60);

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Proximity ---
    /// Strict radius for reward qualification (miles)
    pub proximity_buffer_miles: f64,
    /// Coarse radius for general proximity (miles)
    pub attraction_proximity_range_miles: f64,
    /// Default K for nearest-attraction rankings
    pub nearby_attractions_count: usize,

    // --- Batch processing ---
    /// Maximum units of work in flight per batch
    pub batch_concurrency: usize,
    /// Wall-clock budget for a population tracking pass
    pub track_budget: Duration,
    /// Wall-clock budget for a population rewards pass
    pub rewards_budget: Duration,

    // --- Background tracker ---
    /// Pause between tracking passes
    pub tracking_interval: Duration,

    // --- Data ---
    /// GeoJSON attraction catalog
    pub attractions_path: PathBuf,
    /// Simulated users created at startup
    pub internal_user_count: usize,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            proximity_buffer_miles: DEFAULT_PROXIMITY_BUFFER_MILES,
            attraction_proximity_range_miles: DEFAULT_ATTRACTION_PROXIMITY_RANGE_MILES,
            nearby_attractions_count: DEFAULT_NEARBY_ATTRACTIONS_COUNT,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
            track_budget: DEFAULT_TRACK_BUDGET,
            rewards_budget: DEFAULT_REWARDS_BUDGET,
            tracking_interval: Duration::from_secs(5 * 60),
            attractions_path: PathBuf::from("data/attractions.geojson"),
            internal_user_count: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();
        let config = Self {
            proximity_buffer_miles: parse_var(
                "PROXIMITY_BUFFER_MILES",
                defaults.proximity_buffer_miles,
            )?,
            attraction_proximity_range_miles: parse_var(
                "ATTRACTION_PROXIMITY_RANGE_MILES",
                defaults.attraction_proximity_range_miles,
            )?,
            nearby_attractions_count: parse_var(
                "NEARBY_ATTRACTIONS_COUNT",
                defaults.nearby_attractions_count,
            )?,
            batch_concurrency: parse_var("BATCH_CONCURRENCY", defaults.batch_concurrency)?,
            track_budget: Duration::from_secs(parse_var(
                "TRACK_BUDGET_SECS",
                defaults.track_budget.as_secs(),
            )?),
            rewards_budget: Duration::from_secs(parse_var(
                "REWARDS_BUDGET_SECS",
                defaults.rewards_budget.as_secs(),
            )?),
            tracking_interval: Duration::from_secs(parse_var(
                "TRACKING_INTERVAL_SECS",
                defaults.tracking_interval.as_secs(),
            )?),
            attractions_path: env::var("ATTRACTIONS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.attractions_path),
            internal_user_count: parse_var("INTERNAL_USER_COUNT", defaults.internal_user_count)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_radius("PROXIMITY_BUFFER_MILES", self.proximity_buffer_miles)?;
        check_radius(
            "ATTRACTION_PROXIMITY_RANGE_MILES",
            self.attraction_proximity_range_miles,
        )?;
        if self.batch_concurrency == 0 {
            return Err(ConfigError::Invalid {
                name: "BATCH_CONCURRENCY",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// A proximity radius must be a finite, non-negative number of miles.
pub(crate) fn check_radius(name: &'static str, miles: f64) -> Result<(), ConfigError> {
    if miles.is_finite() && miles >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name,
            reason: format!("{} is not a non-negative distance in miles", miles),
        })
    }
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: format!("cannot parse {:?}: {}", raw, e),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
