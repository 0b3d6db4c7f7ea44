//! Outline pipeline service.

mod context;
mod errors;
mod prompts;
mod runner;

pub use context::{build_request, chapter_excerpts, ProjectBrief};
pub use errors::{PipelineError, StageFailureReport};
pub use prompts::{base_system_prompt, stage_prompt, system_prompt};
pub use runner::{PipelineRun, PipelineRunner};
