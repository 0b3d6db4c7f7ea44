//! RunPipelineHandler - Command handler that takes a project to Ready.

use std::sync::Arc;

use crate::application::pipeline::{PipelineError, PipelineRunner, ProjectBrief};
use crate::domain::foundation::ProjectId;
use crate::domain::pipeline::{PipelineStage, ProjectPipelineState};

/// Command to run a project's pipeline.
#[derive(Debug, Clone)]
pub struct RunPipelineCommand {
    pub project_id: ProjectId,
    pub brief: ProjectBrief,
    /// Regenerate this stage and everything after it before continuing.
    pub regenerate_from: Option<PipelineStage>,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunPipelineResult {
    pub state: ProjectPipelineState,
    /// Stages generated by this run, in order.
    pub generated: Vec<PipelineStage>,
}

/// Handler for running pipelines.
pub struct RunPipelineHandler {
    runner: Arc<PipelineRunner>,
}

impl RunPipelineHandler {
    pub fn new(runner: Arc<PipelineRunner>) -> Self {
        Self { runner }
    }

    pub async fn handle(&self, cmd: RunPipelineCommand) -> Result<RunPipelineResult, PipelineError> {
        // 1. Open (fresh or resumed)
        let mut run = self.runner.open(cmd.project_id, cmd.brief).await?;
        let before = run.state().completed_artifacts.len();

        // 2. Regenerate on request
        if let Some(stage) = cmd.regenerate_from {
            run.run_stage(stage, true).await?;
        }

        // 3. Run the remaining stages
        if !run.state().is_ready() {
            run.run_to_ready().await?;
        }

        let state = run.into_state();
        let generated = generated_stages(&state, before, cmd.regenerate_from);
        Ok(RunPipelineResult { state, generated })
    }
}

fn generated_stages(
    state: &ProjectPipelineState,
    completed_before: usize,
    regenerate_from: Option<PipelineStage>,
) -> Vec<PipelineStage> {
    let first = match regenerate_from {
        Some(stage) => stage.order_index().min(completed_before),
        None => completed_before,
    };
    PipelineStage::producing()
        .iter()
        .copied()
        .filter(|stage| stage.order_index() >= first && state.has_artifact(*stage))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cache::LruThinkingCache;
    use crate::adapters::model::MockModelProvider;
    use crate::adapters::skills::InMemorySkillStore;
    use crate::adapters::storage::InMemoryPipelineStorage;
    use crate::application::skills::SkillRouter;
    use crate::application::thinking::{ThinkingEngine, ThinkingSettings};
    use crate::config::{PipelineConfig, SkillsConfig};

    fn handler(model: MockModelProvider, storage: InMemoryPipelineStorage) -> RunPipelineHandler {
        let router = SkillRouter::new(Arc::new(InMemorySkillStore::new()), SkillsConfig::default());
        let engine = ThinkingEngine::new(
            Arc::new(model),
            Arc::new(LruThinkingCache::new(20)),
            ThinkingSettings::default(),
        );
        RunPipelineHandler::new(Arc::new(PipelineRunner::new(
            Arc::new(storage),
            Arc::new(router),
            Arc::new(engine),
            PipelineConfig::default(),
        )))
    }

    fn full_script() -> MockModelProvider {
        MockModelProvider::new()
            .with_response(r#"{"scene_formula": [1, 2, 3, 4]}"#)
            .with_response(r#"{"volumes": [{"chapter_beats": [1, 2, 3, 4]}]}"#)
            .with_response(r#"{"storyboard": [1, 2, 3]}"#)
            .with_response(r#"{"characters": [], "shots": [1, 2, 3]}"#)
    }

    fn command(regenerate_from: Option<PipelineStage>) -> RunPipelineCommand {
        RunPipelineCommand {
            project_id: ProjectId::new("code-talisman").unwrap(),
            brief: ProjectBrief::from_idea("程序员穿越修仙界用代码画符"),
            regenerate_from,
        }
    }

    #[tokio::test]
    async fn test_handle_runs_fresh_project_to_ready() {
        let handler = handler(full_script(), InMemoryPipelineStorage::new());

        let result = handler.handle(command(None)).await.unwrap();

        assert!(result.state.is_ready());
        assert_eq!(result.generated, PipelineStage::producing().to_vec());
    }

    #[tokio::test]
    async fn test_handle_ready_project_is_noop() {
        let storage = InMemoryPipelineStorage::new();
        let model = full_script();
        handler(model.clone(), storage.clone())
            .handle(command(None))
            .await
            .unwrap();

        let result = handler(model.clone(), storage)
            .handle(command(None))
            .await
            .unwrap();

        assert!(result.generated.is_empty());
        assert_eq!(model.call_count(), 4);
    }

    #[tokio::test]
    async fn test_handle_regenerates_from_stage() {
        let storage = InMemoryPipelineStorage::new();
        let model = full_script()
            .with_response(r#"{"storyboard": [1, 2, 3, 4]}"#)
            .with_response(r#"{"characters": [], "shots": [1, 2, 3, 4]}"#);
        handler(model.clone(), storage.clone())
            .handle(command(None))
            .await
            .unwrap();

        let result = handler(model.clone(), storage)
            .handle(command(Some(PipelineStage::WorldState)))
            .await
            .unwrap();

        assert!(result.state.is_ready());
        assert_eq!(
            result.generated,
            vec![PipelineStage::WorldState, PipelineStage::CharacterInit]
        );
        assert_eq!(model.call_count(), 6);
    }
}
