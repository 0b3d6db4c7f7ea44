//! Mock Model Provider for testing.
//!
//! Scripted implementation of the ModelProvider port so pipeline and engine
//! tests run without a real model endpoint.
//!
//! # Features
//!
//! - Queued responses, returned in order
//! - Simulated delays for timeout testing
//! - Error injection for retry testing
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let provider = MockModelProvider::new()
//!     .with_response(r#"{"shots": [1, 2, 3, 4]}"#)
//!     .with_error(MockError::Unavailable { message: "503".into() });
//!
//! let text = provider.invoke(prompt, config).await?;
//! assert_eq!(provider.call_count(), 1);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{InvocationConfig, ModelInvocationError, ModelPrompt, ModelProvider};

/// Mock model provider with scripted responses.
#[derive(Debug, Clone, Default)]
pub struct MockModelProvider {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

/// A scripted response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Success { content: String, delay: Duration },
    Error(MockError),
}

/// Errors the mock can inject.
#[derive(Debug, Clone)]
pub enum MockError {
    RateLimited { retry_after_secs: u32 },
    Unavailable { message: String },
    AuthenticationFailed,
    Network { message: String },
    InvalidRequest { message: String },
}

impl From<MockError> for ModelInvocationError {
    fn from(err: MockError) -> Self {
        match err {
            MockError::RateLimited { retry_after_secs } => {
                ModelInvocationError::RateLimited { retry_after_secs }
            }
            MockError::Unavailable { message } => ModelInvocationError::unavailable(message),
            MockError::AuthenticationFailed => ModelInvocationError::AuthenticationFailed,
            MockError::Network { message } => ModelInvocationError::network(message),
            MockError::InvalidRequest { message } => ModelInvocationError::InvalidRequest(message),
        }
    }
}

/// One recorded invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: ModelPrompt,
    pub config: InvocationConfig,
}

fn guard<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockModelProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_delayed_response(content, Duration::ZERO)
    }

    /// Queue a successful response that arrives after `delay`.
    pub fn with_delayed_response(self, content: impl Into<String>, delay: Duration) -> Self {
        guard(&self.responses).push_back(MockResponse::Success {
            content: content.into(),
            delay,
        });
        self
    }

    /// Queue an error.
    pub fn with_error(self, error: MockError) -> Self {
        guard(&self.responses).push_back(MockResponse::Error(error));
        self
    }

    /// Delay applied before every response.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn call_count(&self) -> usize {
        guard(&self.calls).len()
    }

    pub fn get_calls(&self) -> Vec<RecordedCall> {
        guard(&self.calls).clone()
    }

    fn next_response(&self) -> Option<MockResponse> {
        guard(&self.responses).pop_front()
    }
}

#[async_trait]
impl ModelProvider for MockModelProvider {
    async fn invoke(
        &self,
        prompt: ModelPrompt,
        config: InvocationConfig,
    ) -> Result<String, ModelInvocationError> {
        guard(&self.calls).push(RecordedCall { prompt, config });

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        match self.next_response() {
            Some(MockResponse::Success { content, delay }) => {
                if !delay.is_zero() {
                    sleep(delay).await;
                }
                Ok(content)
            }
            Some(MockResponse::Error(err)) => Err(err.into()),
            None => Err(ModelInvocationError::unavailable(
                "mock provider has no scripted response left",
            )),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
