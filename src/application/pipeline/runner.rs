//! PipelineRunner - Drives a project through the outline stages.
//!
//! A run owns the project's pipeline state. Each stage routes a skill,
//! builds its context from stored artifacts, asks the thinking engine, then
//! persists the artifact followed by the advanced state. A failed stage
//! leaves artifacts and `current_stage` untouched and only appends the
//! failed attempt to the history.

use chrono::Utc;
use std::sync::Arc;

use super::context::{build_request, ProjectBrief};
use super::errors::PipelineError;
use crate::application::skills::SkillRouter;
use crate::application::thinking::ThinkingEngine;
use crate::config::PipelineConfig;
use crate::domain::foundation::{AttemptId, ProjectId};
use crate::domain::pipeline::{
    Artifact, AttemptOutcome, PipelineStage, ProjectPipelineState, StageAttempt,
};
use crate::domain::skills::SkillDecision;
use crate::domain::thinking::{ThinkingError, ThinkingOutcome, ThinkingRequest};
use crate::ports::{PipelineStorage, StorageError};

pub struct PipelineRunner {
    storage: Arc<dyn PipelineStorage>,
    router: Arc<SkillRouter>,
    engine: Arc<ThinkingEngine>,
    config: PipelineConfig,
}

impl PipelineRunner {
    pub fn new(
        storage: Arc<dyn PipelineStorage>,
        router: Arc<SkillRouter>,
        engine: Arc<ThinkingEngine>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            storage,
            router,
            engine,
            config,
        }
    }

    /// Opens a run for a project.
    ///
    /// Persisted state is used as is. Without it, storage is probed for
    /// artifacts and only the contiguous completed prefix is kept.
    pub async fn open(
        &self,
        project_id: ProjectId,
        brief: ProjectBrief,
    ) -> Result<PipelineRun<'_>, PipelineError> {
        let state = match self.storage.load_state(&project_id).await? {
            Some(state) => {
                tracing::info!(
                    project_id = %project_id,
                    stage = %state.current_stage,
                    "resuming persisted pipeline"
                );
                state
            }
            None => {
                let mut found = Vec::new();
                for stage in PipelineStage::producing() {
                    if let Some(artifact_ref) =
                        self.storage.locate_artifact(&project_id, *stage).await?
                    {
                        found.push(artifact_ref);
                    }
                }
                let state = ProjectPipelineState::from_found_artifacts(project_id, found);
                tracing::info!(
                    project_id = %state.project_id,
                    stage = %state.current_stage,
                    recovered = state.completed_artifacts.len(),
                    "opened pipeline"
                );
                state
            }
        };

        Ok(PipelineRun {
            runner: self,
            brief,
            state,
        })
    }
}

/// One run over a single project.
pub struct PipelineRun<'a> {
    runner: &'a PipelineRunner,
    brief: ProjectBrief,
    state: ProjectPipelineState,
}

impl<'a> PipelineRun<'a> {
    pub fn state(&self) -> &ProjectPipelineState {
        &self.state
    }

    pub fn into_state(self) -> ProjectPipelineState {
        self.state
    }

    /// Runs one stage and returns its artifact.
    ///
    /// Without `regenerate`, a stage that already has an artifact returns it
    /// without invoking the model. With `regenerate`, the stage's artifact and
    /// every downstream artifact are deleted first.
    ///
    /// # Errors
    ///
    /// - `AlreadyReady` / `PrerequisiteMissing` for the terminal stage
    /// - `PrerequisiteMissing` when a required artifact is absent
    /// - `StageFailed` when the thinking engine gives up
    /// - `InvalidArtifact` when the accepted output cannot become an artifact
    /// - `Storage` on persistence failures
    pub async fn run_stage(
        &mut self,
        stage: PipelineStage,
        regenerate: bool,
    ) -> Result<Artifact, PipelineError> {
        let project_id = self.state.project_id.clone();

        if !stage.produces_artifact() {
            return Err(self.terminal_error(stage));
        }

        if regenerate {
            self.invalidate_from(stage).await?;
        } else if self.state.has_artifact(stage) {
            match self.runner.storage.load_artifact(&project_id, stage).await? {
                Some(artifact) => {
                    tracing::debug!(project_id = %project_id, %stage, "artifact exists, skipping");
                    return Ok(artifact);
                }
                None => {
                    tracing::warn!(
                        project_id = %project_id,
                        %stage,
                        "recorded artifact missing from storage, regenerating"
                    );
                    self.invalidate_from(stage).await?;
                }
            }
        }

        let missing = self.state.missing_prerequisites(stage);
        if !missing.is_empty() {
            return Err(PipelineError::PrerequisiteMissing { stage, missing });
        }

        let started_at = Utc::now();
        let decision = self
            .runner
            .router
            .route(&self.brief.intent, self.brief.has_prior_chapters())
            .await;
        let prerequisites = self.load_prerequisites(stage).await?;
        let mut request = build_request(
            stage,
            &self.brief,
            &decision,
            &prerequisites,
            &self.runner.config,
        );
        if regenerate {
            request = request.refreshed();
        }

        tracing::info!(
            project_id = %project_id,
            %stage,
            skill = %decision.skill_name,
            degraded = decision.is_degraded(),
            "running stage"
        );

        let outcome = match self.think(request).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let attempt = failed_attempt(
                    stage,
                    &decision,
                    started_at,
                    err.kind(),
                    err.last_reason(),
                );
                self.record_failure(attempt).await;
                tracing::error!(project_id = %project_id, %stage, error = %err, "stage failed");
                return Err(PipelineError::StageFailed { stage, source: err });
            }
        };

        let artifact = match Artifact::from_model_output(stage, &outcome.result.content) {
            Ok(artifact) => artifact,
            Err(reason) => {
                let attempt = failed_attempt(
                    stage,
                    &decision,
                    started_at,
                    "invalid_artifact",
                    reason.clone(),
                );
                self.record_failure(attempt).await;
                tracing::error!(project_id = %project_id, %stage, %reason, "invalid artifact");
                return Err(PipelineError::InvalidArtifact { stage, reason });
            }
        };

        let artifact_ref = self.runner.storage.save_artifact(&project_id, &artifact).await?;
        let attempt = StageAttempt {
            attempt_id: AttemptId::new(),
            stage,
            skill_name: decision.skill_name.clone(),
            skill_degraded: decision.is_degraded(),
            started_at,
            finished_at: Utc::now(),
            outcome: AttemptOutcome::Succeeded {
                mode_used: outcome.result.mode_used,
                shot_count: outcome.result.shot_count,
                retry_count: outcome.result.retry_count,
                cache_hit: outcome.cache_hit,
            },
        };
        let next = self.state.with_completed(artifact_ref, attempt);
        self.runner.storage.save_state(&next).await?;

        tracing::info!(
            project_id = %project_id,
            from = %stage,
            to = %next.current_stage,
            mode = %outcome.result.mode_used,
            shots = outcome.result.shot_count,
            cache_hit = outcome.cache_hit,
            "stage completed"
        );
        self.state = next;
        Ok(artifact)
    }

    /// Runs every remaining stage, stopping at the first failure.
    pub async fn run_to_ready(&mut self) -> Result<&ProjectPipelineState, PipelineError> {
        if self.state.is_ready() {
            return Err(PipelineError::AlreadyReady);
        }
        while !self.state.current_stage.is_terminal() {
            let stage = self.state.current_stage;
            self.run_stage(stage, false).await?;
        }
        tracing::info!(project_id = %self.state.project_id, "pipeline ready");
        Ok(&self.state)
    }

    async fn think(&self, request: ThinkingRequest) -> Result<ThinkingOutcome, ThinkingError> {
        match self.brief.mode {
            Some(mode) => self.runner.engine.think(request, mode).await,
            None => self.runner.engine.think_default(request).await,
        }
    }

    async fn invalidate_from(&mut self, stage: PipelineStage) -> Result<(), PipelineError> {
        let project_id = self.state.project_id.clone();
        for downstream in stage.with_downstream() {
            if downstream.produces_artifact() {
                self.runner
                    .storage
                    .delete_artifact(&project_id, downstream)
                    .await?;
            }
        }
        let mut next = self.state.clone();
        let dropped = next.invalidate_from(stage);
        self.runner.storage.save_state(&next).await?;
        tracing::info!(
            project_id = %project_id,
            %stage,
            dropped = dropped.len(),
            "invalidated artifacts"
        );
        self.state = next;
        Ok(())
    }

    async fn load_prerequisites(&self, stage: PipelineStage) -> Result<Vec<Artifact>, PipelineError> {
        let mut artifacts = Vec::with_capacity(stage.required_artifacts().len());
        for required in stage.required_artifacts() {
            match self
                .runner
                .storage
                .load_artifact(&self.state.project_id, *required)
                .await?
            {
                Some(artifact) => artifacts.push(artifact),
                None => return Err(StorageError::NoArtifactForStage(*required).into()),
            }
        }
        Ok(artifacts)
    }

    async fn record_failure(&mut self, attempt: StageAttempt) {
        self.state.record_failure(attempt);
        if let Err(err) = self.runner.storage.save_state(&self.state).await {
            tracing::warn!(
                project_id = %self.state.project_id,
                error = %err,
                "could not persist failed attempt"
            );
        }
    }

    fn terminal_error(&self, stage: PipelineStage) -> PipelineError {
        let missing = self.state.missing_prerequisites(stage);
        if missing.is_empty() {
            PipelineError::AlreadyReady
        } else {
            PipelineError::PrerequisiteMissing { stage, missing }
        }
    }
}

fn failed_attempt(
    stage: PipelineStage,
    decision: &SkillDecision,
    started_at: chrono::DateTime<Utc>,
    kind: &str,
    reason: String,
) -> StageAttempt {
    StageAttempt {
        attempt_id: AttemptId::new(),
        stage,
        skill_name: decision.skill_name.clone(),
        skill_degraded: decision.is_degraded(),
        started_at,
        finished_at: Utc::now(),
        outcome: AttemptOutcome::Failed {
            kind: kind.to_string(),
            reason,
        },
    }
}
