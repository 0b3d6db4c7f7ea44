//! Application layer - Services and command handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! the thinking engine wraps the model port, the skill router wraps the
//! skill store, and the pipeline runner drives both against storage.

pub mod handlers;
pub mod pipeline;
pub mod skills;
pub mod thinking;

pub use handlers::{RunPipelineCommand, RunPipelineHandler, RunPipelineResult};
pub use pipeline::{PipelineError, PipelineRun, PipelineRunner, ProjectBrief, StageFailureReport};
pub use skills::SkillRouter;
pub use thinking::{ThinkingEngine, ThinkingSettings};
