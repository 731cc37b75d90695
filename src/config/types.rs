//! Configuration types

use serde::{Deserialize, Serialize};

pub use super::models::{BasketballConfig, HockeyConfig};
use crate::common::errors::Result;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database configuration (optional; replay can run from a file)
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
    /// Basketball model coefficients
    #[serde(default)]
    pub basketball: BasketballConfig,
    /// Hockey model coefficients
    #[serde(default)]
    pub hockey: HockeyConfig,
}

impl AppConfig {
    /// Check every model's coefficients
    pub fn validate(&self) -> Result<()> {
        self.basketball.validate()?;
        self.hockey.validate()?;
        Ok(())
    }
}

/// Database configuration for tick and snapshot persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Connection timeout in seconds
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_seconds: u64,
}

fn default_max_connections() -> u32 {
    5
}

fn default_connection_timeout() -> u64 {
    30
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Seconds between polling cycles for live games
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Absolute tolerance for replay comparisons
    #[serde(default = "default_replay_tolerance")]
    pub replay_tolerance: f64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            poll_interval_seconds: default_poll_interval(),
            replay_tolerance: default_replay_tolerance(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_poll_interval() -> u64 {
    15
}

fn default_replay_tolerance() -> f64 {
    1e-9
}
