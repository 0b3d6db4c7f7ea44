//! Thinking engine configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::thinking::{ModeBudget, ThinkingMode, TruncationLimits};

/// Thinking engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ThinkingConfig {
    /// Mode used when a caller does not ask for one
    #[serde(default)]
    pub default_mode: ThinkingMode,

    /// Entries held by the process-wide thinking cache
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,

    /// Attempts allowed after the first one
    #[serde(default = "default_quality_retry")]
    pub quality_retry: u32,

    /// Per-invocation model timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "ModeBudgetConfig::fast")]
    pub fast: ModeBudgetConfig,

    #[serde(default = "ModeBudgetConfig::deep", deserialize_with = "deserialize_deep")]
    pub deep: ModeBudgetConfig,
}

/// Budget of one thinking mode
///
/// Unset shot and token limits fall back to the mode's defaults, so a
/// single variable such as `STORYLOOM__THINKING__DEEP__MIN_SHOTS` can be
/// overridden alone.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeBudgetConfig {
    #[serde(skip)]
    mode: BudgetMode,

    #[serde(default = "default_previous_context_chars")]
    pub previous_context_chars: usize,

    #[serde(default = "default_world_context_chars")]
    pub world_context_chars: usize,

    #[serde(default)]
    pub min_shots: Option<u32>,

    #[serde(default)]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum BudgetMode {
    #[default]
    Fast,
    Deep,
}

impl ModeBudgetConfig {
    fn fast() -> Self {
        Self {
            mode: BudgetMode::Fast,
            previous_context_chars: default_previous_context_chars(),
            world_context_chars: default_world_context_chars(),
            min_shots: None,
            max_tokens: None,
        }
    }

    fn deep() -> Self {
        Self {
            mode: BudgetMode::Deep,
            ..Self::fast()
        }
    }

    pub fn min_shots(&self) -> u32 {
        self.min_shots.unwrap_or(match self.mode {
            BudgetMode::Fast => 3,
            BudgetMode::Deep => 4,
        })
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens.unwrap_or(match self.mode {
            BudgetMode::Fast => 4096,
            BudgetMode::Deep => 8192,
        })
    }

    pub fn budget(&self) -> ModeBudget {
        ModeBudget {
            truncation: TruncationLimits {
                previous_context_chars: self.previous_context_chars,
                world_context_chars: self.world_context_chars,
            },
            min_shots: self.min_shots(),
            max_tokens: self.max_tokens(),
        }
    }

    fn validate(&self, mode: &'static str) -> Result<(), ValidationError> {
        if self.min_shots() == 0 {
            return Err(ValidationError::InvalidMinShots(mode));
        }
        if self.max_tokens() == 0 {
            return Err(ValidationError::InvalidMaxTokens(mode));
        }
        Ok(())
    }
}

impl ThinkingConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Total attempts per `think` call
    pub fn max_attempts(&self) -> u32 {
        self.quality_retry.saturating_add(1)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.cache_capacity == 0 {
            return Err(ValidationError::InvalidCacheCapacity);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        self.fast.validate("fast")?;
        self.deep.validate("deep")?;
        Ok(())
    }
}

impl Default for ThinkingConfig {
    fn default() -> Self {
        Self {
            default_mode: ThinkingMode::default(),
            cache_capacity: default_cache_capacity(),
            quality_retry: default_quality_retry(),
            timeout_secs: default_timeout(),
            fast: ModeBudgetConfig::fast(),
            deep: ModeBudgetConfig::deep(),
        }
    }
}

fn deserialize_deep<'de, D>(deserializer: D) -> Result<ModeBudgetConfig, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let mut budget = ModeBudgetConfig::deserialize(deserializer)?;
    budget.mode = BudgetMode::Deep;
    Ok(budget)
}

fn default_cache_capacity() -> usize {
    20
}

fn default_quality_retry() -> u32 {
    1
}

fn default_timeout() -> u64 {
    120
}

fn default_previous_context_chars() -> usize {
    3000
}

fn default_world_context_chars() -> usize {
    2500
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thinking_config_defaults() {
        let config = ThinkingConfig::default();
        assert_eq!(config.default_mode, ThinkingMode::Auto);
        assert_eq!(config.cache_capacity, 20);
        assert_eq!(config.max_attempts(), 2);
        assert_eq!(config.fast.min_shots(), 3);
        assert_eq!(config.deep.min_shots(), 4);
        assert_eq!(config.deep.max_tokens(), 8192);
        assert_eq!(config.deep.budget().truncation.previous_context_chars, 3000);
        assert_eq!(config.fast.budget().truncation.world_context_chars, 2500);
    }

    #[test]
    fn test_timeout_duration() {
        let config = ThinkingConfig {
            timeout_secs: 30,
            ..Default::default()
        };
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = ThinkingConfig {
            cache_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidCacheCapacity));
    }

    #[test]
    fn test_validate_rejects_zero_min_shots() {
        let mut config = ThinkingConfig::default();
        config.deep.min_shots = Some(0);
        assert_eq!(config.validate(), Err(ValidationError::InvalidMinShots("deep")));
    }

    #[test]
    fn test_partial_deep_section_keeps_deep_defaults() {
        let config: ThinkingConfig =
            serde_json::from_str(r#"{"deep": {"min_shots": 6}}"#).unwrap();
        assert_eq!(config.deep.min_shots(), 6);
        assert_eq!(config.deep.max_tokens(), 8192);
        assert_eq!(config.fast.max_tokens(), 4096);
    }

    #[test]
    fn test_defaults_validate() {
        assert!(ThinkingConfig::default().validate().is_ok());
    }
}
