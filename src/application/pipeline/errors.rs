//! Pipeline errors and the failure report handed to callers.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::pipeline::PipelineStage;
use crate::domain::thinking::ThinkingError;
use crate::ports::StorageError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("stage {stage} failed: {source}")]
    StageFailed {
        stage: PipelineStage,
        #[source]
        source: ThinkingError,
    },

    #[error("stage {stage} cannot run, missing artifacts: {}", format_stages(.missing))]
    PrerequisiteMissing {
        stage: PipelineStage,
        missing: Vec<PipelineStage>,
    },

    #[error("stage {stage} produced an invalid artifact: {reason}")]
    InvalidArtifact { stage: PipelineStage, reason: String },

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("pipeline is already ready")]
    AlreadyReady,
}

impl PipelineError {
    /// The stage that failed, if the error is tied to one.
    pub fn stage(&self) -> Option<PipelineStage> {
        match self {
            PipelineError::StageFailed { stage, .. }
            | PipelineError::PrerequisiteMissing { stage, .. }
            | PipelineError::InvalidArtifact { stage, .. } => Some(*stage),
            PipelineError::Storage(_) | PipelineError::AlreadyReady => None,
        }
    }

    /// Summary for the caller, `None` for errors not tied to a stage.
    pub fn failure_report(&self) -> Option<StageFailureReport> {
        let reason = match self {
            PipelineError::StageFailed { source, .. } => source.last_reason(),
            PipelineError::PrerequisiteMissing { missing, .. } => {
                format!("missing artifacts: {}", format_stages(missing))
            }
            PipelineError::InvalidArtifact { reason, .. } => reason.clone(),
            PipelineError::Storage(_) | PipelineError::AlreadyReady => return None,
        };
        self.stage().map(|stage| StageFailureReport { stage, reason })
    }
}

/// What the caller is told when a stage fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageFailureReport {
    pub stage: PipelineStage,
    pub reason: String,
}

impl fmt::Display for StageFailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.stage, self.reason)
    }
}

fn format_stages(stages: &[PipelineStage]) -> String {
    stages
        .iter()
        .map(PipelineStage::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
