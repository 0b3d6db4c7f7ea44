//! File-based Pipeline Storage Adapter
//!
//! Stores pipeline state and stage artifacts as JSON files under one
//! directory per project:
//!
//! ```text
//! <output_dir>/<project>/pipeline_state.json
//! <output_dir>/<project>/story_blueprint.json
//! <output_dir>/<project>/detailed_outline.json
//! <output_dir>/<project>/world_state.json
//! <output_dir>/<project>/characters.json
//! ```
//!
//! Artifact files hold the bare document so other tools can read them.
//! `<project>` is the sanitized id; ids that sanitization changes get a
//! short digest suffix so distinct ids never share a directory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::foundation::ProjectId;
use crate::domain::pipeline::{
    Artifact, ArtifactDocument, ArtifactRef, PipelineStage, ProjectPipelineState,
};
use crate::ports::{PipelineStorage, StorageError};

const STATE_FILE: &str = "pipeline_state.json";

/// File-based storage for pipeline artifacts and state
#[derive(Debug, Clone)]
pub struct FilePipelineStorage {
    base_path: PathBuf,
}

impl FilePipelineStorage {
    /// Create a new file storage rooted at the given path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Directory of a project.
    ///
    /// Keeps alphanumerics (any script), spaces, `_` and `-`; spaces become
    /// underscores. An id with nothing left maps to `unnamed_project`.
    pub fn project_dir(&self, project_id: &ProjectId) -> PathBuf {
        self.base_path.join(project_dir_name(project_id.as_str()))
    }

    fn state_file_path(&self, project_id: &ProjectId) -> PathBuf {
        self.project_dir(project_id).join(STATE_FILE)
    }

    fn artifact_file_path(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<PathBuf, StorageError> {
        let name = stage
            .artifact_file_name()
            .ok_or(StorageError::NoArtifactForStage(stage))?;
        Ok(self.project_dir(project_id).join(name))
    }

    async fn ensure_dir(&self, path: &Path) -> Result<(), StorageError> {
        fs::create_dir_all(path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))
    }

    async fn modified_at(path: &Path) -> DateTime<Utc> {
        fs::metadata(path)
            .await
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now())
    }
}

fn project_dir_name(id: &str) -> String {
    let safe = sanitize_project_name(id);
    if safe == id {
        return safe;
    }
    let digest = Sha256::digest(id.as_bytes());
    let suffix: String = digest.iter().take(4).map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", safe, suffix)
}

fn sanitize_project_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    let safe = kept.trim().replace(' ', "_");
    if safe.is_empty() {
        "unnamed_project".to_string()
    } else {
        safe
    }
}

#[async_trait]
impl PipelineStorage for FilePipelineStorage {
    async fn load_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<Artifact>, StorageError> {
        if !stage.produces_artifact() {
            return Ok(None);
        }
        let file_path = self.artifact_file_path(project_id, stage)?;
        if !file_path.exists() {
            return Ok(None);
        }

        let raw = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        let document = match serde_json::from_str(&raw) {
            Ok(value) => ArtifactDocument::Json(value),
            Err(_) => ArtifactDocument::Text(raw),
        };

        Ok(Some(Artifact {
            stage,
            document,
            created_at: Self::modified_at(&file_path).await,
        }))
    }

    async fn save_artifact(
        &self,
        project_id: &ProjectId,
        artifact: &Artifact,
    ) -> Result<ArtifactRef, StorageError> {
        let file_path = self.artifact_file_path(project_id, artifact.stage)?;
        self.ensure_dir(&self.project_dir(project_id)).await?;

        let body = match &artifact.document {
            ArtifactDocument::Json(value) => serde_json::to_string_pretty(value)
                .map_err(|e| StorageError::SerializationFailed(e.to_string()))?,
            ArtifactDocument::Text(text) => text.clone(),
        };

        fs::write(&file_path, body)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(ArtifactRef {
            stage: artifact.stage,
            location: file_path.display().to_string(),
            created_at: artifact.created_at,
        })
    }

    async fn locate_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<Option<ArtifactRef>, StorageError> {
        if !stage.produces_artifact() {
            return Ok(None);
        }
        let file_path = self.artifact_file_path(project_id, stage)?;
        if !file_path.is_file() {
            return Ok(None);
        }
        Ok(Some(ArtifactRef {
            stage,
            location: file_path.display().to_string(),
            created_at: Self::modified_at(&file_path).await,
        }))
    }

    async fn delete_artifact(
        &self,
        project_id: &ProjectId,
        stage: PipelineStage,
    ) -> Result<(), StorageError> {
        if !stage.produces_artifact() {
            return Ok(());
        }
        let file_path = self.artifact_file_path(project_id, stage)?;
        match fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::IoError(e.to_string())),
        }
    }

    async fn load_state(
        &self,
        project_id: &ProjectId,
    ) -> Result<Option<ProjectPipelineState>, StorageError> {
        let file_path = self.state_file_path(project_id);
        if !file_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&file_path)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        let state: ProjectPipelineState = serde_json::from_str(&json)
            .map_err(|e| StorageError::DeserializationFailed(e.to_string()))?;

        if state.project_id != *project_id {
            return Err(StorageError::ProjectMismatch {
                expected: project_id.to_string(),
                found: state.project_id.to_string(),
            });
        }
        Ok(Some(state))
    }

    async fn save_state(&self, state: &ProjectPipelineState) -> Result<(), StorageError> {
        let dir = self.project_dir(&state.project_id);
        self.ensure_dir(&dir).await?;

        let json = serde_json::to_string_pretty(state)
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;

        // Temp file plus rename: readers never see a partial state.
        let tmp_path = dir.join(format!("{}.tmp", STATE_FILE));
        fs::write(&tmp_path, json)
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;
        fs::rename(&tmp_path, self.state_file_path(&state.project_id))
            .await
            .map_err(|e| StorageError::IoError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn project() -> ProjectId {
        ProjectId::new("修仙 代码").unwrap()
    }

    fn storage() -> (TempDir, FilePipelineStorage) {
        let dir = TempDir::new().unwrap();
        let storage = FilePipelineStorage::new(dir.path());
        (dir, storage)
    }

    #[test]
    fn test_sanitize_keeps_cjk_and_replaces_spaces() {
        assert_eq!(sanitize_project_name("修仙 代码"), "修仙_代码");
        assert_eq!(sanitize_project_name("a/../b"), "ab");
        assert_eq!(sanitize_project_name("///"), "unnamed_project");
    }

    #[test]
    fn test_dir_name_is_plain_for_clean_ids() {
        assert_eq!(project_dir_name("my_novel"), "my_novel");
        assert_eq!(project_dir_name("幽狱志"), "幽狱志");
    }

    #[test]
    fn test_lossy_ids_get_distinct_dirs() {
        let spaced = project_dir_name("my novel");
        assert!(spaced.starts_with("my_novel-"));
        assert_ne!(spaced, project_dir_name("my_novel"));
        assert_ne!(project_dir_name("a.b"), project_dir_name("ab"));
        assert_ne!(project_dir_name("a.b"), project_dir_name("a/b"));
    }

    #[tokio::test]
    async fn test_similar_ids_do_not_share_state() {
        let (_dir, storage) = storage();
        let spaced = ProjectId::new("my novel").unwrap();
        let underscored = ProjectId::new("my_novel").unwrap();
        storage
            .save_state(&ProjectPipelineState::new(spaced.clone()))
            .await
            .unwrap();

        assert!(storage.load_state(&underscored).await.unwrap().is_none());
        let loaded = storage.load_state(&spaced).await.unwrap().unwrap();
        assert_eq!(loaded.project_id, spaced);
    }

    #[tokio::test]
    async fn test_foreign_state_file_is_rejected() {
        let (_dir, storage) = storage();
        let ours = ProjectId::new("my_novel").unwrap();
        let project_dir = storage.project_dir(&ours);
        fs::create_dir_all(&project_dir).await.unwrap();
        let foreign = ProjectPipelineState::new(ProjectId::new("other").unwrap());
        fs::write(
            project_dir.join(STATE_FILE),
            serde_json::to_string(&foreign).unwrap(),
        )
        .await
        .unwrap();

        let err = storage.load_state(&ours).await.unwrap_err();
        match err {
            StorageError::ProjectMismatch { expected, found } => {
                assert_eq!(expected, "my_novel");
                assert_eq!(found, "other");
            }
            other => panic!("expected project mismatch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_artifact_round_trip() {
        let (_dir, storage) = storage();
        let artifact = Artifact::new(
            PipelineStage::Blueprint,
            ArtifactDocument::Json(json!({"title": "画符"})),
        );

        let artifact_ref = storage.save_artifact(&project(), &artifact).await.unwrap();
        assert!(artifact_ref.location.ends_with("story_blueprint.json"));

        let loaded = storage
            .load_artifact(&project(), PipelineStage::Blueprint)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.document, artifact.document);
    }

    #[tokio::test]
    async fn test_missing_artifact_is_none() {
        let (_dir, storage) = storage();
        let loaded = storage
            .load_artifact(&project(), PipelineStage::WorldState)
            .await
            .unwrap();
        assert!(loaded.is_none());
        assert!(storage
            .locate_artifact(&project(), PipelineStage::WorldState)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_ready_has_no_artifact() {
        let (_dir, storage) = storage();
        let artifact = Artifact::new(PipelineStage::Ready, ArtifactDocument::Text("x".into()));
        let err = storage.save_artifact(&project(), &artifact).await.unwrap_err();
        assert!(matches!(err, StorageError::NoArtifactForStage(PipelineStage::Ready)));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let (_dir, storage) = storage();
        let artifact = Artifact::new(
            PipelineStage::WorldState,
            ArtifactDocument::Json(json!({"locations": []})),
        );
        storage.save_artifact(&project(), &artifact).await.unwrap();

        storage
            .delete_artifact(&project(), PipelineStage::WorldState)
            .await
            .unwrap();
        storage
            .delete_artifact(&project(), PipelineStage::WorldState)
            .await
            .unwrap();

        assert!(storage
            .load_artifact(&project(), PipelineStage::WorldState)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_state_round_trip() {
        let (dir, storage) = storage();
        assert!(storage.load_state(&project()).await.unwrap().is_none());

        let state = ProjectPipelineState::new(project());
        storage.save_state(&state).await.unwrap();

        let loaded = storage.load_state(&project()).await.unwrap().unwrap();
        assert_eq!(loaded, state);
        let project_dir = storage.project_dir(&project());
        assert!(project_dir.starts_with(dir.path()));
        assert!(project_dir.join(STATE_FILE).exists());
    }

    #[tokio::test]
    async fn test_corrupt_state_is_deserialization_error() {
        let (_dir, storage) = storage();
        let project_dir = storage.project_dir(&project());
        fs::create_dir_all(&project_dir).await.unwrap();
        fs::write(project_dir.join(STATE_FILE), "{ not json").await.unwrap();

        let err = storage.load_state(&project()).await.unwrap_err();
        assert!(matches!(err, StorageError::DeserializationFailed(_)));
    }
}
