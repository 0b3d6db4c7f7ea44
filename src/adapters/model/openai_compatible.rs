//! OpenAI-compatible Provider - ModelProvider over a chat completions API.
//!
//! DeepSeek, GLM (Zhipu) and Kimi (Moonshot) all expose the OpenAI chat
//! completions shape, so one client serves every vendor; only the base URL
//! and model name differ.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAiCompatibleConfig::new(api_key)
//!     .with_model("deepseek-chat")
//!     .with_base_url("https://api.deepseek.com");
//!
//! let provider = OpenAiCompatibleProvider::new(config)?;
//! ```
//!
//! The provider makes exactly one HTTP call per `invoke`; retry policy
//! belongs to the thinking engine.

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{InvocationConfig, ModelInvocationError, ModelPrompt, ModelProvider};

/// Configuration for an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl OpenAiCompatibleConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "deepseek-chat".to_string(),
            base_url: "https://api.deepseek.com".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Chat completions client.
pub struct OpenAiCompatibleProvider {
    config: OpenAiCompatibleConfig,
    client: Client,
}

impl OpenAiCompatibleProvider {
    pub fn new(config: OpenAiCompatibleConfig) -> Result<Self, ModelInvocationError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ModelInvocationError::InvalidRequest(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'))
    }

    fn to_chat_request(&self, prompt: ModelPrompt, config: &InvocationConfig) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if !prompt.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: prompt.system,
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user,
        });

        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: Some(config.max_tokens),
            temperature: config.temperature,
            stream: Some(false),
        }
    }

    async fn send_request(&self, request: &ChatRequest) -> Result<Response, ModelInvocationError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelInvocationError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    ModelInvocationError::network(format!("Connection failed: {}", e))
                } else {
                    ModelInvocationError::network(e.to_string())
                }
            })
    }

    /// Maps non-success HTTP statuses onto invocation errors.
    async fn handle_response_status(
        &self,
        response: Response,
    ) -> Result<Response, ModelInvocationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let error_body = response.text().await.unwrap_or_default();
        Err(map_status(status.as_u16(), error_body))
    }

    async fn parse_response(&self, response: Response) -> Result<String, ModelInvocationError> {
        let response = self.handle_response_status(response).await?;

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelInvocationError::parse(format!("Failed to parse response: {}", e)))?;

        let choice = chat
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ModelInvocationError::parse("No choices in response"))?;

        if choice.finish_reason.as_deref() == Some("length") {
            tracing::warn!(model = %self.config.model, "completion truncated at max_tokens");
        }

        Ok(choice.message.content)
    }
}

fn map_status(status: u16, error_body: String) -> ModelInvocationError {
    match status {
        401 | 403 => ModelInvocationError::AuthenticationFailed,
        429 => ModelInvocationError::RateLimited {
            retry_after_secs: parse_retry_after(&error_body),
        },
        400 => {
            if error_body.contains("maximum context length")
                || error_body.contains("context_length_exceeded")
            {
                ModelInvocationError::ContextTooLong(error_body)
            } else {
                ModelInvocationError::InvalidRequest(error_body)
            }
        }
        500..=599 => {
            ModelInvocationError::unavailable(format!("Server error {}: {}", status, error_body))
        }
        _ => ModelInvocationError::network(format!("Unexpected status {}: {}", status, error_body)),
    }
}

/// Extracts "try again in Xs" from an error body, defaulting to 30 seconds.
fn parse_retry_after(error_body: &str) -> u32 {
    serde_json::from_str::<serde_json::Value>(error_body)
        .ok()
        .and_then(|parsed| {
            let message = parsed.get("error")?.get("message")?.as_str()?.to_string();
            let idx = message.find("try again in ")?;
            let rest = &message[idx + "try again in ".len()..];
            let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
            digits.parse::<u32>().ok()
        })
        .unwrap_or(30)
}

#[async_trait]
impl ModelProvider for OpenAiCompatibleProvider {
    async fn invoke(
        &self,
        prompt: ModelPrompt,
        config: InvocationConfig,
    ) -> Result<String, ModelInvocationError> {
        let request = self.to_chat_request(prompt, &config);
        tracing::debug!(
            model = %self.config.model,
            mode = %config.mode,
            max_tokens = config.max_tokens,
            "sending chat completion"
        );
        let response = self.send_request(&request).await?;
        self.parse_response(response).await
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    finish_reason: Option<String>,
}
