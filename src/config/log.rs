//! Logging configuration

use serde::Deserialize;

/// Logging configuration
///
/// Filtering comes from `RUST_LOG`; this section only selects the format.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

impl LogConfig {
    pub fn default_filter() -> &'static str {
        "storyloom=info"
    }
}
