//! Configuration management for the NutriClinic CLI
//!
//! Configuration is loaded hierarchically:
//! 1. Default values (in code)
//! 2. TOML config files (config/development.toml or config/production.toml)
//! 3. Environment variables (prefix: NUTRI__)

use anyhow::Result;
use nutriclinic_engine::EngineConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "nutriclinic_engine=info,nutriclinic=info".to_string(),
            json: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from files and environment
    ///
    /// Loading order (later sources override earlier):
    /// 1. Default values
    /// 2. Config file based on NUTRI_ENV (development.toml or production.toml)
    /// 3. Environment variables with NUTRI__ prefix
    pub fn load() -> Result<Self> {
        let config_file = format!("config/{}.toml", Self::environment());

        let config = config::Config::builder()
            .add_source(config::Config::try_from(&CliConfig::default())?)
            .add_source(config::File::with_name(&config_file).required(false))
            // e.g. NUTRI__ENGINE__WHR_POLICY=sex_specific sets engine.whr_policy
            .add_source(
                config::Environment::with_prefix("NUTRI")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: CliConfig = config.try_deserialize()?;
        loaded.engine.validate()?;
        Ok(loaded)
    }

    /// Name of the active environment
    pub fn environment() -> String {
        env::var("NUTRI_ENV").unwrap_or_else(|_| "development".to_string())
    }

    /// Check if running in production mode
    pub fn is_production() -> bool {
        Self::environment() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutriclinic_engine::WhrPolicy;

    #[test]
    fn test_default_config() {
        let config = CliConfig::default();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.engine.whr_policy, WhrPolicy::Unisex);
        assert!(!config.logging.json);
        assert!(config.logging.level.contains("nutriclinic_engine"));
    }

    #[test]
    fn test_defaults_survive_config_round_trip() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&CliConfig::default()).unwrap())
            .build()
            .unwrap();
        let config: CliConfig = built.try_deserialize().unwrap();
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_toml_overrides_engine_settings() {
        let built = config::Config::builder()
            .add_source(config::Config::try_from(&CliConfig::default()).unwrap())
            .add_source(config::File::from_str(
                "[engine]\nwhr_policy = \"sex_specific\"\nminimum_intake_kcal = 1500.0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: CliConfig = built.try_deserialize().unwrap();
        assert_eq!(config.engine.whr_policy, WhrPolicy::SexSpecific);
        assert_eq!(config.engine.minimum_intake_kcal, 1500.0);
        assert_eq!(config.engine.planner, EngineConfig::default().planner);
    }
}
