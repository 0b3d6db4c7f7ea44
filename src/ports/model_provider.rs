//! Model Provider Port - Interface for language model invocation.
//!
//! The thinking engine is the only caller. Implementations connect to a chat
//! completion endpoint (or a script, in tests) and return raw text.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::thinking::{ResolvedMode, TruncationLimits};

/// Port for language model calls.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Run one completion and return the raw response text.
    async fn invoke(
        &self,
        prompt: ModelPrompt,
        config: InvocationConfig,
    ) -> Result<String, ModelInvocationError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

/// Prompt pair sent to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelPrompt {
    pub system: String,
    pub user: String,
}

impl ModelPrompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Per-invocation settings derived from the resolved mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationConfig {
    pub mode: ResolvedMode,
    pub max_tokens: u32,
    pub truncation: TruncationLimits,
    pub temperature: Option<f32>,
}

/// Errors from model invocation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelInvocationError {
    /// Rate limited by provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u32 },

    /// Prompt exceeds the model context window.
    #[error("context too long: {0}")]
    ContextTooLong(String),

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable { message: String },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider response.
    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl ModelInvocationError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        ModelInvocationError::Unavailable {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        ModelInvocationError::Network(message.into())
    }

    pub fn parse(message: impl Into<String>) -> Self {
        ModelInvocationError::Parse(message.into())
    }

    /// Delay the provider asked for before the next call.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            ModelInvocationError::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(u64::from(*retry_after_secs)))
            }
            _ => None,
        }
    }

    /// Returns true if another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelInvocationError::RateLimited { .. }
                | ModelInvocationError::Unavailable { .. }
                | ModelInvocationError::Network(_)
                | ModelInvocationError::Timeout { .. }
        )
    }
}
