//! Language model configuration

use serde::Deserialize;
use std::fmt;

use super::error::ValidationError;

/// Model vendor. All real vendors speak the OpenAI chat completions API.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ModelVendor {
    #[default]
    DeepSeek,
    Glm,
    Kimi,
    /// Scripted offline provider
    Mock,
}

impl ModelVendor {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ModelVendor::DeepSeek => "https://api.deepseek.com",
            ModelVendor::Glm => "https://open.bigmodel.cn/api/paas/v4",
            ModelVendor::Kimi => "https://api.moonshot.cn/v1",
            ModelVendor::Mock => "",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            ModelVendor::DeepSeek => "deepseek-chat",
            ModelVendor::Glm => "glm-4-plus",
            ModelVendor::Kimi => "kimi-k2.5",
            ModelVendor::Mock => "mock",
        }
    }
}

/// Language model configuration
#[derive(Clone, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub vendor: ModelVendor,

    /// API key, required for every vendor except `mock`
    pub api_key: Option<String>,

    /// Overrides the vendor's base URL
    pub base_url: Option<String>,

    /// Overrides the vendor's default model
    pub model: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl ModelConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.vendor.default_base_url())
    }

    pub fn model_name(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.vendor.default_model())
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.vendor == ModelVendor::Mock {
            return Ok(());
        }
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("MODEL__API_KEY"));
        }
        let url = self.base_url();
        if !url.starts_with("https://") && !url.starts_with("http://") {
            return Err(ValidationError::InvalidBaseUrl);
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ValidationError::InvalidTemperature);
        }
        Ok(())
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("vendor", &self.vendor)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            vendor: ModelVendor::default(),
            api_key: None,
            base_url: None,
            model: None,
            temperature: default_temperature(),
        }
    }
}

fn default_temperature() -> f32 {
    0.7
}
