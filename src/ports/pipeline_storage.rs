//! Pipeline Storage Port - Interface for persisting artifacts and state.
//!
//! One project owns one namespace. Artifacts are stored per stage; the
//! pipeline state is a single document per project.

use async_trait::async_trait;

use crate::domain::foundation::ProjectId;
use crate::domain::pipeline::{Artifact, ArtifactRef, PipelineStage, ProjectPipelineState};

/// Errors that can occur during pipeline storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Artifact not stored for stage: {0}")]
    NoArtifactForStage(PipelineStage),

    #[error("Failed to serialize: {0}")]
    SerializationFailed(String),

    #[error("Failed to deserialize: {0}")]
    DeserializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),

    /// The stored state belongs to a different project.
    #[error("State file belongs to project '{found}', not '{expected}'")]
    ProjectMismatch { expected: String, found: String },
}

/// Port for persisting pipeline artifacts and state
#[async_trait]
pub trait PipelineStorage: Send + Sync {
    /// Load the artifact of a stage, `None` if absent.
    async fn load_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<Artifact>, StorageError>;

    /// Save the artifact of a stage, replacing any previous one.
    ///
    /// # Errors
    /// Returns `StorageError::NoArtifactForStage` for `Ready`.
    async fn save_artifact(
        &self,
        project_id: &ProjectId,
        artifact: &Artifact,
    ) -> Result<ArtifactRef, StorageError>;

    /// Locate a stored artifact without reading it, `None` if absent.
    async fn locate_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<ArtifactRef>, StorageError>;

    /// Delete the artifact of a stage. Deleting an absent artifact is a no-op.
    async fn delete_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<(), StorageError>;

    /// Load the pipeline state, `None` for a project never persisted.
    async fn load_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectPipelineState>, StorageError>;

    /// Save the pipeline state.
    async fn save_state(&self, state: &ProjectPipelineState) -> Result<(), StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_names_stage() {
        let err = StorageError::NoArtifactForStage(PipelineStage::Ready);
        assert_eq!(err.to_string(), "Artifact not stored for stage: Ready");
    }

    #[test]
    fn test_storage_error_io() {
        let err = StorageError::IoError("permission denied".to_string());
        assert!(err.to_string().contains("IO error"));
    }
}
