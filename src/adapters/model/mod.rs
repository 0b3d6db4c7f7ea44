//! Model provider adapters.
//!
//! - `OpenAiCompatibleProvider` - chat completions over HTTP (DeepSeek, GLM, Kimi)
//! - `MockModelProvider` - scripted provider for tests and offline runs

mod mock_provider;
mod openai_compatible;

pub use mock_provider::{MockError, MockModelProvider, MockResponse, RecordedCall};
pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleProvider};
