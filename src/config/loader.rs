//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AppConfig, DatabaseConfig};
use crate::common::errors::{EngineError, Result};

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP_, `__` separated)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    // e.g. APP__BASKETBALL__LINEUP_WEIGHT=0.5
    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    let app: AppConfig = config
        .try_deserialize()
        .map_err(|e| EngineError::Configuration(e.to_string()))?;

    app.validate()?;
    Ok(app)
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let database = std::env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
        url,
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5),
        connection_timeout_seconds: 30,
    });

    Ok(AppConfig {
        database,
        ..AppConfig::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let config = load_config(Some("does-not-exist.toml")).unwrap();
        assert_eq!(config.settings.poll_interval_seconds, 15);
        assert_eq!(config.basketball.regulation_minutes, 48.0);
        assert_eq!(config.hockey.regulation_minutes, 60.0);
    }

    #[test]
    fn test_file_overrides_model_constants() {
        let dir = std::env::temp_dir().join(format!("live_projection_cfg_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("engine.toml");
        std::fs::write(
            &path,
            "[settings]\npoll_interval_seconds = 5\n\n[hockey]\nxg_cap = 0.5\n",
        )
        .unwrap();

        let config = load_config(path.to_str()).unwrap();
        assert_eq!(config.settings.poll_interval_seconds, 5);
        assert_eq!(config.hockey.xg_cap, 0.5);
        assert_eq!(config.hockey.goalie_weak, 1.15);

        std::fs::remove_dir_all(&dir).ok();
    }
}
