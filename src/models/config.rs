//! Configuration module for the escalation desk
//!
//! Read once at startup from the environment. Names and defaults live in
//! utils/constants.rs.

use std::time::Duration;
use tracing::info;

use crate::models::errors::{AppError, AppResult};
use crate::models::types::Actor;
use crate::utils::constants::{
    DEFAULT_ACTOR, DEFAULT_API_URL, DEFAULT_POLL_SECS, DEFAULT_TIMEOUT_SECS, ENV_ACTOR,
    ENV_API_URL, ENV_POLL_SECS, ENV_TIMEOUT_SECS,
};

/// Configuration for the desk
#[derive(Debug, Clone)]
pub struct DeskConfig {
    /// Base URL of the investigation API, without trailing slash
    pub api_base_url: String,
    /// Timeout applied to every request
    pub request_timeout: Duration,
    /// Interval for polled list views
    pub poll_interval: Duration,
    /// Operator identity recorded on freeze/unfreeze and reports
    pub actor: Actor,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            poll_interval: Duration::from_secs(DEFAULT_POLL_SECS),
            actor: Actor::new(DEFAULT_ACTOR),
        }
    }
}

impl DeskConfig {
    /// Load configuration from process environment
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base_url = lookup(ENV_API_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base_url);
        if !api_base_url.starts_with("http://") && !api_base_url.starts_with("https://") {
            return Err(AppError::invalid_config(format!(
                "{} must be an http(s) URL, got '{}'",
                ENV_API_URL, api_base_url
            )));
        }

        let timeout_secs = parse_secs(&lookup, ENV_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS)?;
        let poll_secs = parse_secs(&lookup, ENV_POLL_SECS, DEFAULT_POLL_SECS)?;

        let actor = lookup(ENV_ACTOR)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(Actor::new)
            .unwrap_or(defaults.actor);

        let config = Self {
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(timeout_secs),
            poll_interval: Duration::from_secs(poll_secs),
            actor,
        };

        info!(
            "⚙️ API: {} | timeout {}s | poll {}s | actor {}",
            config.api_base_url, timeout_secs, poll_secs, config.actor
        );

        Ok(config)
    }

    /// Override the base URL (stub servers in tests)
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}

fn parse_secs<F>(lookup: &F, key: &str, default: u64) -> AppResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AppError::invalid_config(format!("{} must be a whole number of seconds", key))
            })?;
            if secs == 0 {
                return Err(AppError::invalid_config(format!("{} must be at least 1", key)));
            }
            Ok(secs)
        }
    }
}
