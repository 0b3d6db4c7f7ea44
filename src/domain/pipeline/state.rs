//! Per-project pipeline state and stage attempt history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ArtifactRef, PipelineStage};
use crate::domain::foundation::{AttemptId, ProjectId};
use crate::domain::thinking::ResolvedMode;

/// Returns the first stage lacking an artifact, or `Ready` when all exist.
pub fn resolve_entry_point(completed: &BTreeMap<PipelineStage, ArtifactRef>) -> PipelineStage {
    PipelineStage::producing()
        .iter()
        .copied()
        .find(|stage| !completed.contains_key(stage))
        .unwrap_or(PipelineStage::Ready)
}

/// How one stage attempt ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Succeeded {
        mode_used: ResolvedMode,
        shot_count: u32,
        retry_count: u32,
        cache_hit: bool,
    },
    Failed {
        kind: String,
        reason: String,
    },
}

/// One execution of a stage, kept for diagnosis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageAttempt {
    pub attempt_id: AttemptId,
    pub stage: PipelineStage,
    pub skill_name: String,
    #[serde(default)]
    pub skill_degraded: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcome: AttemptOutcome,
}

impl StageAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}

/// Progress of one project through the outline pipeline.
///
/// Exclusively owned by the run operating on the project. Mutations go
/// through methods that keep `current_stage` equal to the entry point of
/// `completed_artifacts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectPipelineState {
    pub project_id: ProjectId,
    pub current_stage: PipelineStage,
    #[serde(default)]
    pub completed_artifacts: BTreeMap<PipelineStage, ArtifactRef>,
    #[serde(default)]
    pub stage_history: Vec<StageAttempt>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectPipelineState {
    /// Creates the state of a project with no artifacts.
    pub fn new(project_id: ProjectId) -> Self {
        Self {
            project_id,
            current_stage: PipelineStage::Blueprint,
            completed_artifacts: BTreeMap::new(),
            stage_history: Vec::new(),
            updated_at: Utc::now(),
        }
    }

    /// Rebuilds state from artifacts found in storage.
    ///
    /// Only the contiguous prefix of stages is kept: an artifact whose
    /// predecessor is missing cannot be trusted and is ignored.
    pub fn from_found_artifacts(project_id: ProjectId, found: Vec<ArtifactRef>) -> Self {
        let mut by_stage: BTreeMap<PipelineStage, ArtifactRef> =
            found.into_iter().map(|r| (r.stage, r)).collect();
        let mut state = Self::new(project_id);
        for stage in PipelineStage::producing() {
            match by_stage.remove(stage) {
                Some(artifact_ref) => {
                    state.completed_artifacts.insert(*stage, artifact_ref);
                }
                None => break,
            }
        }
        state.current_stage = resolve_entry_point(&state.completed_artifacts);
        state
    }

    pub fn has_artifact(&self, stage: PipelineStage) -> bool {
        self.completed_artifacts.contains_key(&stage)
    }

    pub fn is_ready(&self) -> bool {
        self.current_stage == PipelineStage::Ready
    }

    /// Prerequisite artifacts of `stage` that are not yet complete.
    pub fn missing_prerequisites(&self, stage: PipelineStage) -> Vec<PipelineStage> {
        stage
            .required_artifacts()
            .iter()
            .copied()
            .filter(|required| !self.has_artifact(*required))
            .collect()
    }

    /// Returns a copy with the artifact committed and the stage advanced.
    pub fn with_completed(&self, artifact_ref: ArtifactRef, attempt: StageAttempt) -> Self {
        let mut next = self.clone();
        next.completed_artifacts.insert(artifact_ref.stage, artifact_ref);
        next.stage_history.push(attempt);
        next.current_stage = resolve_entry_point(&next.completed_artifacts);
        next.updated_at = Utc::now();
        next
    }

    /// Records a failed attempt. Stage and artifacts stay unchanged.
    pub fn record_failure(&mut self, attempt: StageAttempt) {
        self.stage_history.push(attempt);
        self.updated_at = Utc::now();
    }

    /// Drops `stage` and every downstream artifact, returning what was dropped.
    pub fn invalidate_from(&mut self, stage: PipelineStage) -> Vec<PipelineStage> {
        let dropped: Vec<PipelineStage> = stage
            .with_downstream()
            .into_iter()
            .filter(|s| self.completed_artifacts.remove(s).is_some())
            .collect();
        self.current_stage = resolve_entry_point(&self.completed_artifacts);
        self.updated_at = Utc::now();
        dropped
    }

    /// The most recent attempt for `stage`, if any.
    pub fn last_attempt(&self, stage: PipelineStage) -> Option<&StageAttempt> {
        self.stage_history.iter().rev().find(|a| a.stage == stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_ref(stage: PipelineStage) -> ArtifactRef {
        ArtifactRef {
            stage,
            location: format!("mem://{}", stage.as_str()),
            created_at: Utc::now(),
        }
    }

    fn attempt(stage: PipelineStage, outcome: AttemptOutcome) -> StageAttempt {
        StageAttempt {
            attempt_id: AttemptId::new(),
            stage,
            skill_name: "outline-skill".to_string(),
            skill_degraded: false,
            started_at: Utc::now(),
            finished_at: Utc::now(),
            outcome,
        }
    }

    fn success() -> AttemptOutcome {
        AttemptOutcome::Succeeded {
            mode_used: ResolvedMode::Deep,
            shot_count: 4,
            retry_count: 0,
            cache_hit: false,
        }
    }

    fn project() -> ProjectId {
        ProjectId::new("demo").unwrap()
    }

    #[test]
    fn entry_point_of_empty_map_is_blueprint() {
        assert_eq!(resolve_entry_point(&BTreeMap::new()), PipelineStage::Blueprint);
    }

    #[test]
    fn entry_point_is_first_missing_stage() {
        let mut completed = BTreeMap::new();
        completed.insert(PipelineStage::Blueprint, artifact_ref(PipelineStage::Blueprint));
        completed.insert(PipelineStage::WorldState, artifact_ref(PipelineStage::WorldState));
        assert_eq!(resolve_entry_point(&completed), PipelineStage::DetailedOutline);
    }

    #[test]
    fn entry_point_is_ready_when_all_present() {
        let completed = PipelineStage::producing()
            .iter()
            .map(|s| (*s, artifact_ref(*s)))
            .collect();
        assert_eq!(resolve_entry_point(&completed), PipelineStage::Ready);
    }

    #[test]
    fn found_artifacts_keep_only_contiguous_prefix() {
        let state = ProjectPipelineState::from_found_artifacts(
            project(),
            vec![
                artifact_ref(PipelineStage::CharacterInit),
                artifact_ref(PipelineStage::Blueprint),
                artifact_ref(PipelineStage::WorldState),
            ],
        );
        assert_eq!(state.current_stage, PipelineStage::DetailedOutline);
        assert_eq!(state.completed_artifacts.len(), 1);
        assert!(state.has_artifact(PipelineStage::Blueprint));
    }

    #[test]
    fn with_completed_advances_without_mutating_original() {
        let state = ProjectPipelineState::new(project());
        let next = state.with_completed(
            artifact_ref(PipelineStage::Blueprint),
            attempt(PipelineStage::Blueprint, success()),
        );
        assert_eq!(state.current_stage, PipelineStage::Blueprint);
        assert_eq!(next.current_stage, PipelineStage::DetailedOutline);
        assert_eq!(next.stage_history.len(), 1);
    }

    #[test]
    fn record_failure_keeps_stage() {
        let mut state = ProjectPipelineState::new(project());
        state.record_failure(attempt(
            PipelineStage::Blueprint,
            AttemptOutcome::Failed {
                kind: "quality_gate_failure".to_string(),
                reason: "only 2 shots".to_string(),
            },
        ));
        assert_eq!(state.current_stage, PipelineStage::Blueprint);
        assert!(state.completed_artifacts.is_empty());
        assert!(!state.last_attempt(PipelineStage::Blueprint).unwrap().succeeded());
    }

    #[test]
    fn invalidate_from_drops_stage_and_downstream() {
        let state = ProjectPipelineState::from_found_artifacts(
            project(),
            PipelineStage::producing().iter().map(|s| artifact_ref(*s)).collect(),
        );
        assert!(state.is_ready());

        let mut state = state;
        let dropped = state.invalidate_from(PipelineStage::WorldState);
        assert_eq!(
            dropped,
            vec![PipelineStage::WorldState, PipelineStage::CharacterInit]
        );
        assert_eq!(state.current_stage, PipelineStage::WorldState);
        assert!(state.has_artifact(PipelineStage::DetailedOutline));
    }

    #[test]
    fn missing_prerequisites_lists_absent_inputs() {
        let state = ProjectPipelineState::from_found_artifacts(
            project(),
            vec![artifact_ref(PipelineStage::Blueprint)],
        );
        assert_eq!(
            state.missing_prerequisites(PipelineStage::CharacterInit),
            vec![PipelineStage::WorldState]
        );
        assert!(state.missing_prerequisites(PipelineStage::DetailedOutline).is_empty());
    }

    #[test]
    fn state_round_trips_through_json() {
        let state = ProjectPipelineState::new(project()).with_completed(
            artifact_ref(PipelineStage::Blueprint),
            attempt(PipelineStage::Blueprint, success()),
        );
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"blueprint\""));
        let back: ProjectPipelineState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, state);
    }
}
