//! Request and result types exchanged with the thinking engine.

use serde::{Deserialize, Serialize};

use super::mode::ResolvedMode;
use crate::domain::pipeline::PipelineStage;

/// Everything the engine needs to deliberate on one stage.
///
/// Context strings are passed unclipped; the engine applies the mode budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThinkingRequest {
    pub stage: PipelineStage,
    pub system_prompt: String,
    pub prompt: String,
    /// Upstream artifacts the stage builds on. Sent whole, never clipped.
    pub artifacts: String,
    pub previous_context: String,
    pub world_context: String,
    /// Skip the cache lookup. An accepted result is still stored.
    pub refresh: bool,
}

impl ThinkingRequest {
    pub fn new(stage: PipelineStage, prompt: impl Into<String>) -> Self {
        Self {
            stage,
            system_prompt: String::new(),
            prompt: prompt.into(),
            artifacts: String::new(),
            previous_context: String::new(),
            world_context: String::new(),
            refresh: false,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_artifacts(mut self, artifacts: impl Into<String>) -> Self {
        self.artifacts = artifacts.into();
        self
    }

    pub fn with_previous_context(mut self, previous_context: impl Into<String>) -> Self {
        self.previous_context = previous_context.into();
        self
    }

    pub fn with_world_context(mut self, world_context: impl Into<String>) -> Self {
        self.world_context = world_context.into();
        self
    }

    pub fn refreshed(mut self) -> Self {
        self.refresh = true;
        self
    }
}

/// Accepted output of the thinking engine. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThinkingResult {
    pub content: String,
    pub mode_used: ResolvedMode,
    pub shot_count: u32,
    pub quality_passed: bool,
    /// Attempts made beyond the first.
    pub retry_count: u32,
}

/// A result together with whether it came from the cache.
#[derive(Debug, Clone, PartialEq)]
pub struct ThinkingOutcome {
    pub result: ThinkingResult,
    pub cache_hit: bool,
}
