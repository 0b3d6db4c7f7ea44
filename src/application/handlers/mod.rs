//! Command handlers.

mod run_pipeline;

pub use run_pipeline::{RunPipelineCommand, RunPipelineHandler, RunPipelineResult};
