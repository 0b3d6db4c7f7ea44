//! Thinking engine errors.

use thiserror::Error;

use super::quality::Shortfall;
use crate::domain::pipeline::PipelineStage;

/// Failure of a `think` call after the retry budget is spent.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ThinkingError {
    /// The final attempt produced a response that failed a quality gate.
    #[error("{stage} failed the quality gate after {attempts} attempt(s): {shortfall}")]
    QualityGateFailure {
        stage: PipelineStage,
        attempts: u32,
        shortfall: Shortfall,
    },

    /// The model could not produce a response.
    #[error("{stage} generation failed after {attempts} attempt(s): {reason}")]
    GenerationFailure {
        stage: PipelineStage,
        attempts: u32,
        reason: String,
    },
}

impl ThinkingError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            ThinkingError::QualityGateFailure { stage, .. }
            | ThinkingError::GenerationFailure { stage, .. } => *stage,
        }
    }

    pub fn attempts(&self) -> u32 {
        match self {
            ThinkingError::QualityGateFailure { attempts, .. }
            | ThinkingError::GenerationFailure { attempts, .. } => *attempts,
        }
    }

    /// Human-readable reason of the last failed attempt.
    pub fn last_reason(&self) -> String {
        match self {
            ThinkingError::QualityGateFailure { shortfall, .. } => shortfall.to_string(),
            ThinkingError::GenerationFailure { reason, .. } => reason.clone(),
        }
    }

    /// Stable kind label recorded in stage history.
    pub fn kind(&self) -> &'static str {
        match self {
            ThinkingError::QualityGateFailure { .. } => "quality_gate_failure",
            ThinkingError::GenerationFailure { .. } => "generation_failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_failure_reports_shortfall() {
        let err = ThinkingError::QualityGateFailure {
            stage: PipelineStage::Blueprint,
            attempts: 2,
            shortfall: Shortfall::TooFewShots { found: 1, required: 4 },
        };
        assert_eq!(err.stage(), PipelineStage::Blueprint);
        assert_eq!(err.attempts(), 2);
        assert_eq!(err.kind(), "quality_gate_failure");
        assert!(err.to_string().contains("only 1 shots enumerated"));
    }

    #[test]
    fn generation_failure_reports_reason() {
        let err = ThinkingError::GenerationFailure {
            stage: PipelineStage::WorldState,
            attempts: 1,
            reason: "authentication failed".to_string(),
        };
        assert_eq!(err.last_reason(), "authentication failed");
        assert_eq!(err.kind(), "generation_failure");
    }
}
