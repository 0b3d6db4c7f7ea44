//! Thinking engine service.

mod engine;

pub use engine::{ThinkingEngine, ThinkingSettings};
