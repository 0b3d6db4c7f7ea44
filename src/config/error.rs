//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Thinking cache capacity must be at least 1")]
    InvalidCacheCapacity,

    #[error("Invalid model timeout")]
    InvalidTimeout,

    #[error("Minimum shots for {0} mode must be at least 1")]
    InvalidMinShots(&'static str),

    #[error("Max tokens for {0} mode must be at least 1")]
    InvalidMaxTokens(&'static str),

    #[error("Skill name for {0} must not be empty")]
    EmptySkillName(&'static str),

    #[error("Chapter count must be between 1 and 1000")]
    InvalidChapterCount,

    #[error("Temperature must be between 0.0 and 2.0")]
    InvalidTemperature,

    #[error("Invalid model base URL format")]
    InvalidBaseUrl,
}
