//! Stage artifacts and the references to them kept in pipeline state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::PipelineStage;
use crate::domain::thinking::extract_json_object;

/// Body of an artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtifactDocument {
    /// Structured stage output.
    Json(Value),
    /// Plain text, used for chapter output consumed downstream.
    Text(String),
}

impl ArtifactDocument {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ArtifactDocument::Json(value) => Some(value),
            ArtifactDocument::Text(_) => None,
        }
    }

    /// Renders the document as text for inclusion in a prompt.
    pub fn render(&self) -> String {
        match self {
            ArtifactDocument::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            ArtifactDocument::Text(text) => text.clone(),
        }
    }
}

/// The persisted output of one stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub stage: PipelineStage,
    pub document: ArtifactDocument,
    pub created_at: DateTime<Utc>,
}

impl Artifact {
    pub fn new(stage: PipelineStage, document: ArtifactDocument) -> Self {
        Self {
            stage,
            document,
            created_at: Utc::now(),
        }
    }

    /// Builds a JSON artifact from raw model output.
    pub fn from_model_output(stage: PipelineStage, raw: &str) -> Result<Self, String> {
        let value = extract_json_object(raw)?;
        Ok(Self::new(stage, ArtifactDocument::Json(value)))
    }
}

/// Where an artifact was stored, as recorded in pipeline state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    pub stage: PipelineStage,
    pub location: String,
    pub created_at: DateTime<Utc>,
}
