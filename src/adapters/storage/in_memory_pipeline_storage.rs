//! In-Memory Pipeline Storage Adapter
//!
//! Stores pipeline state and artifacts in memory.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::ProjectId;
use crate::domain::pipeline::{Artifact, ArtifactRef, PipelineStage, ProjectPipelineState};
use crate::ports::{PipelineStorage, StorageError};

/// In-memory storage for pipeline artifacts and state
#[derive(Debug, Clone, Default)]
pub struct InMemoryPipelineStorage {
    states: Arc<RwLock<HashMap<ProjectId, ProjectPipelineState>>>,
    artifacts: Arc<RwLock<HashMap<(ProjectId, PipelineStage), Artifact>>>,
}

impl InMemoryPipelineStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an artifact directly, bypassing the pipeline.
    pub async fn insert_artifact(&self, project_id: &ProjectId, artifact: Artifact) {
        self.artifacts
            .write()
            .await
            .insert((project_id.clone(), artifact.stage), artifact);
    }

    /// Number of artifacts stored (for testing)
    pub async fn artifact_count(&self) -> usize {
        self.artifacts.read().await.len()
    }

    /// Number of states stored (for testing)
    pub async fn state_count(&self) -> usize {
        self.states.read().await.len()
    }

    fn location(project_id: &ProjectId, stage: PipelineStage) -> String {
        format!("memory://{}/{}", project_id, stage.as_str())
    }
}

#[async_trait]
impl PipelineStorage for InMemoryPipelineStorage {
    async fn load_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<Artifact>, StorageError> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts.get(&(project_id.clone(), stage)).cloned())
    }

    async fn save_artifact(
        &self,
        project_id: &ProjectId,
        artifact: &Artifact,
    ) -> Result<ArtifactRef, StorageError> {
        if !artifact.stage.produces_artifact() {
            return Err(StorageError::NoArtifactForStage(artifact.stage));
        }
        let mut artifacts = self.artifacts.write().await;
        artifacts.insert((project_id.clone(), artifact.stage), artifact.clone());
        Ok(ArtifactRef {
            stage: artifact.stage,
            location: Self::location(project_id, artifact.stage),
            created_at: artifact.created_at,
        })
    }

    async fn locate_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<ArtifactRef>, StorageError> {
        let artifacts = self.artifacts.read().await;
        Ok(artifacts
            .get(&(project_id.clone(), stage))
            .map(|artifact| ArtifactRef {
                stage,
                location: Self::location(project_id, stage),
                created_at: artifact.created_at,
            }))
    }

    async fn delete_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<(), StorageError> {
        let mut artifacts = self.artifacts.write().await;
        artifacts.remove(&(project_id.clone(), stage));
        Ok(())
    }

    async fn load_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectPipelineState>, StorageError> {
        let states = self.states.read().await;
        Ok(states.get(project_id).cloned())
    }

    async fn save_state(&self, state: &ProjectPipelineState) -> Result<(), StorageError> {
        let mut states = self.states.write().await;
        states.insert(state.project_id.clone(), state.clone());
        Ok(())
    }
}
