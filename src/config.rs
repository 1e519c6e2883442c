use chrono::Duration;
use serde::Deserialize;
use std::fs;

use crate::classifier::CANCELLATION_WINDOW_HOURS;
use crate::error::{Result, StoreError};

/// Longest cancellation window a config may ask for: one year.
pub const MAX_CANCELLATION_WINDOW_HOURS: i64 = 24 * 365;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub base_url: String,
    pub api_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PolicyConfig {
    #[serde(default = "default_window_hours")]
    pub cancellation_window_hours: i64,
    #[serde(default = "default_cancel_reason")]
    pub default_cancel_reason: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            cancellation_window_hours: default_window_hours(),
            default_cancel_reason: default_cancel_reason(),
        }
    }
}

impl PolicyConfig {
    pub fn cancellation_window(&self) -> Duration {
        Duration::hours(self.cancellation_window_hours.clamp(0, MAX_CANCELLATION_WINDOW_HOURS))
    }
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_window_hours() -> i64 {
    CANCELLATION_WINDOW_HOURS
}

fn default_cancel_reason() -> String {
    "Change of plans".to_string()
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            StoreError::Config(format!("Failed to read config file '{}': {}", path, e))
        })?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;

        let hours = config.policy.cancellation_window_hours;
        if !(0..=MAX_CANCELLATION_WINDOW_HOURS).contains(&hours) {
            return Err(StoreError::Config(format!(
                "cancellation_window_hours must be between 0 and {} (got {})",
                MAX_CANCELLATION_WINDOW_HOURS, hours
            )));
        }

        Ok(config)
    }
}
