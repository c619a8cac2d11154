//! Resolved runtime configuration.
//!
//! `Default` carries the documented defaults; [`AppConfig::from_env`] overlays
//! values from the environment. The rest of the crate only ever sees the
//! resolved structs.

use crate::error::{CricketError, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const API_KEY_ENV_VAR: &str = "RAPIDAPI_KEY";
pub const API_HOST_ENV_VAR: &str = "RAPIDAPI_HOST";
pub const DB_PATH_ENV_VAR: &str = "CRICBUZZ_DB_PATH";
pub const DB_POOL_SIZE_ENV_VAR: &str = "CRICBUZZ_DB_POOL_SIZE";
pub const REFRESH_SECS_ENV_VAR: &str = "CRICBUZZ_REFRESH_SECS";
pub const LIVE_TTL_ENV_VAR: &str = "CRICBUZZ_LIVE_TTL_SECS";
pub const STATIC_TTL_ENV_VAR: &str = "CRICBUZZ_STATIC_TTL_SECS";
pub const MAX_CALLS_ENV_VAR: &str = "CRICBUZZ_MAX_CALLS_PER_MINUTE";
pub const MAX_ATTEMPTS_ENV_VAR: &str = "CRICBUZZ_MAX_ATTEMPTS";

pub const DEFAULT_API_HOST: &str = "cricbuzz-cricket.p.rapidapi.com";

/// Sliding-window request budget.
#[derive(Debug, Clone, PartialEq)]
pub struct RateLimitPolicy {
    pub max_requests: u32,
    pub window: Duration,
    /// Longest a caller may be held back waiting for a slot. `None` waits as
    /// long as needed; `Some(Duration::ZERO)` fails immediately.
    pub max_wait: Option<Duration>,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_requests: 60,
            window: Duration::from_secs(60),
            max_wait: Some(Duration::from_secs(60)),
        }
    }
}

/// Retry schedule for transient API failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(800),
            max_backoff: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub host: String,
    pub api_key: Option<String>,
    /// TTL for live endpoints (match lists, match centre, scorecards).
    pub live_ttl: Duration,
    /// TTL for reference data (teams, squads, series, venues, profiles).
    pub static_ttl: Duration,
    pub cache_capacity: usize,
    pub request_timeout: Duration,
    pub rate_limit: RateLimitPolicy,
    pub retry: RetryPolicy,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: format!("https://{DEFAULT_API_HOST}"),
            host: DEFAULT_API_HOST.to_string(),
            api_key: None,
            live_ttl: Duration::from_secs(60),
            static_ttl: Duration::from_secs(3600),
            cache_capacity: 256,
            request_timeout: Duration::from_secs(10),
            rate_limit: RateLimitPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub pool_size: u32,
    pub acquire_timeout: Duration,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    /// Path: ~/.cache/cricbuzz-stats/cricket.db
    pub fn default_path() -> PathBuf {
        let base = dirs::cache_dir().unwrap_or_else(|| {
            let mut home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.push(".cache");
            home
        });
        base.join("cricbuzz-stats").join("cricket.db")
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: Self::default_path(),
            pool_size: 4,
            acquire_timeout: Duration::from_secs(5),
            busy_timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    /// Interval between live-match polling rounds.
    pub refresh_interval: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            database: DatabaseConfig::default(),
            refresh_interval: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Defaults overlaid with the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`. Blank values are ignored.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get(API_KEY_ENV_VAR) {
            config.api.api_key = Some(key.trim().to_string());
        }
        if let Some(host) = get(API_HOST_ENV_VAR) {
            let host = host.trim().to_string();
            config.api.base_url = format!("https://{host}");
            config.api.host = host;
        }
        if let Some(path) = get(DB_PATH_ENV_VAR) {
            config.database.path = PathBuf::from(path);
        }
        if let Some(size) = get(DB_POOL_SIZE_ENV_VAR) {
            config.database.pool_size = parse_value(DB_POOL_SIZE_ENV_VAR, &size)?;
        }
        if let Some(secs) = get(REFRESH_SECS_ENV_VAR) {
            config.refresh_interval = parse_secs(REFRESH_SECS_ENV_VAR, &secs)?;
        }
        if let Some(secs) = get(LIVE_TTL_ENV_VAR) {
            config.api.live_ttl = parse_secs(LIVE_TTL_ENV_VAR, &secs)?;
        }
        if let Some(secs) = get(STATIC_TTL_ENV_VAR) {
            config.api.static_ttl = parse_secs(STATIC_TTL_ENV_VAR, &secs)?;
        }
        if let Some(calls) = get(MAX_CALLS_ENV_VAR) {
            config.api.rate_limit.max_requests = parse_value(MAX_CALLS_ENV_VAR, &calls)?;
        }
        if let Some(attempts) = get(MAX_ATTEMPTS_ENV_VAR) {
            config.api.retry.max_attempts = parse_value(MAX_ATTEMPTS_ENV_VAR, &attempts)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(config_error(DB_POOL_SIZE_ENV_VAR, "must be at least 1"));
        }
        if self.api.rate_limit.max_requests == 0 {
            return Err(config_error(MAX_CALLS_ENV_VAR, "must be at least 1"));
        }
        if self.api.retry.max_attempts == 0 {
            return Err(config_error(MAX_ATTEMPTS_ENV_VAR, "must be at least 1"));
        }
        if self.api.cache_capacity == 0 {
            return Err(config_error("cache_capacity", "must be at least 1"));
        }
        if self.refresh_interval.is_zero() {
            return Err(config_error(REFRESH_SECS_ENV_VAR, "must be at least 1 second"));
        }
        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| config_error(key, &format!("'{}' is not a valid number", raw.trim())))
}

fn parse_secs(key: &str, raw: &str) -> Result<Duration> {
    parse_value::<u64>(key, raw).map(Duration::from_secs)
}

fn config_error(key: &str, problem: &str) -> CricketError {
    CricketError::Config {
        message: format!("{key} {problem}"),
    }
}
