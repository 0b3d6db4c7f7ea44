//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `STORYLOOM` prefix and nested values use double underscores as separators.
//! Every section has defaults, so an empty environment yields a usable
//! configuration apart from the model API key.
//!
//! # Example
//!
//! ```no_run
//! use storyloom::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Cache holds {} results", config.thinking.cache_capacity);
//! ```

mod error;
mod log;
mod model;
mod pipeline;
mod skills;
mod thinking;

pub use error::{ConfigError, ValidationError};
pub use log::LogConfig;
pub use model::{ModelConfig, ModelVendor};
pub use pipeline::{PipelineConfig, StorageConfig};
pub use skills::SkillsConfig;
pub use thinking::{ModeBudgetConfig, ThinkingConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Thinking engine (modes, budgets, cache, retry)
    #[serde(default)]
    pub thinking: ThinkingConfig,

    /// Skill routing
    #[serde(default)]
    pub skills: SkillsConfig,

    /// Artifact storage
    #[serde(default)]
    pub storage: StorageConfig,

    /// Stage context building
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Language model endpoint
    #[serde(default)]
    pub model: ModelConfig,

    /// Log output format
    #[serde(default)]
    pub log: LogConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STORYLOOM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `STORYLOOM__THINKING__CACHE_CAPACITY=50` -> `thinking.cache_capacity = 50`
    /// - `STORYLOOM__MODEL__VENDOR=glm` -> `model.vendor = glm`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("STORYLOOM")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.thinking.validate()?;
        self.skills.validate()?;
        self.pipeline.validate()?;
        self.model.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::thinking::ThinkingMode;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "STORYLOOM__THINKING__DEFAULT_MODE",
        "STORYLOOM__THINKING__CACHE_CAPACITY",
        "STORYLOOM__THINKING__DEEP__MIN_SHOTS",
        "STORYLOOM__SKILLS__ENABLED",
        "STORYLOOM__MODEL__VENDOR",
        "STORYLOOM__MODEL__API_KEY",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_with_empty_environment_uses_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.thinking.cache_capacity, 20);
        assert_eq!(config.thinking.default_mode, ThinkingMode::Auto);
        assert!(config.skills.enabled);
        assert_eq!(config.model.vendor, ModelVendor::DeepSeek);
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var("STORYLOOM__THINKING__DEFAULT_MODE", "fast");
        env::set_var("STORYLOOM__THINKING__CACHE_CAPACITY", "5");
        env::set_var("STORYLOOM__THINKING__DEEP__MIN_SHOTS", "6");
        env::set_var("STORYLOOM__SKILLS__ENABLED", "false");
        env::set_var("STORYLOOM__MODEL__VENDOR", "kimi");
        env::set_var("STORYLOOM__MODEL__API_KEY", "sk-test");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.thinking.default_mode, ThinkingMode::Fast);
        assert_eq!(config.thinking.cache_capacity, 5);
        assert_eq!(config.thinking.deep.min_shots(), 6);
        assert_eq!(config.thinking.deep.max_tokens(), 8192);
        assert!(!config.skills.enabled);
        assert_eq!(config.model.vendor, ModelVendor::Kimi);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = AppConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("MODEL__API_KEY"))
        );
    }
}
