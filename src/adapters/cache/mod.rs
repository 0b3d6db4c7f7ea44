//! Thinking cache adapters.

mod lru_thinking_cache;
mod noop_thinking_cache;

pub use lru_thinking_cache::LruThinkingCache;
pub use noop_thinking_cache::NoOpThinkingCache;
