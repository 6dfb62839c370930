//! Runtime configuration.
//!
//! Defaults are built in; each field can be overridden from the environment
//! with a `RANKBOARD_` prefixed variable:
//!
//! - `RANKBOARD_LISTEN_ADDR=0.0.0.0:8080`
//! - `RANKBOARD_MIN_SCORE=100` / `RANKBOARD_MAX_SCORE=5000`
//! - `RANKBOARD_DEFAULT_PAGE_LIMIT=50` / `RANKBOARD_MAX_PAGE_LIMIT=100`
//! - `RANKBOARD_DEFAULT_SEARCH_LIMIT=20`
//! - `RANKBOARD_REQUEST_TIMEOUT_MS=2000`
//! - `RANKBOARD_SEED_POPULATION=10000`

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::score::Score;

pub const ENV_PREFIX: &str = "RANKBOARD_";

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Invalid { key, value, reason } => {
                write!(f, "invalid value {:?} for {}: {}", value, key, reason)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankboardConfig {
    /// Address the HTTP server binds to.
    pub listen_addr: String,
    /// Lowest score the API accepts.
    pub min_score: Score,
    /// Highest score the API accepts.
    pub max_score: Score,
    /// Page size used when the request's limit is missing or out of range.
    pub default_page_limit: i64,
    pub max_page_limit: i64,
    pub default_search_limit: usize,
    /// Per-request deadline for engine operations.
    pub request_timeout_ms: u64,
    /// Number of random users to create at startup. 0 disables seeding.
    pub seed_population: usize,
}

impl Default for RankboardConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            min_score: Score(100),
            max_score: Score(5000),
            default_page_limit: 50,
            max_page_limit: 100,
            default_search_limit: 20,
            request_timeout_ms: 2000,
            seed_population: 0,
        }
    }
}

impl RankboardConfig {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each full variable
    /// name. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            let key = format!("{}{}", ENV_PREFIX, name);
            lookup(&key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (key, v))
        };

        let mut config = Self::default();
        if let Some((_, value)) = get("LISTEN_ADDR") {
            config.listen_addr = value;
        }
        if let Some((key, value)) = get("MIN_SCORE") {
            config.min_score = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("MAX_SCORE") {
            config.max_score = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("DEFAULT_PAGE_LIMIT") {
            config.default_page_limit = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("MAX_PAGE_LIMIT") {
            config.max_page_limit = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("DEFAULT_SEARCH_LIMIT") {
            config.default_search_limit = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = parse(&key, &value)?;
        }
        if let Some((key, value)) = get("SEED_POPULATION") {
            config.seed_population = parse(&key, &value)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_score > self.max_score {
            return Err(invalid(
                "MIN_SCORE",
                self.min_score,
                format!("greater than max score {}", self.max_score),
            ));
        }
        if self.max_page_limit < 1 {
            return Err(invalid("MAX_PAGE_LIMIT", self.max_page_limit, "must be at least 1"));
        }
        if !(1..=self.max_page_limit).contains(&self.default_page_limit) {
            return Err(invalid(
                "DEFAULT_PAGE_LIMIT",
                self.default_page_limit,
                format!("must be within 1..={}", self.max_page_limit),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn parse<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        key: key.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

fn invalid(name: &str, value: impl fmt::Display, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        key: format!("{}{}", ENV_PREFIX, name),
        value: value.to_string(),
        reason: reason.into(),
    }
}
