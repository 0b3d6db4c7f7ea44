//! Pipeline and storage configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;

/// Artifact storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory; each project gets a subdirectory
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
        }
    }
}

/// Stage context configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Chapter count target when the caller gives none
    #[serde(default = "default_chapter_count")]
    pub default_chapter_count: u32,

    /// How many of the latest prior chapters are quoted into prompts
    #[serde(default = "default_prior_chapter_excerpts")]
    pub prior_chapter_excerpts: usize,

    /// Characters kept from the tail of each quoted chapter
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.default_chapter_count == 0 || self.default_chapter_count > 1000 {
            return Err(ValidationError::InvalidChapterCount);
        }
        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_chapter_count: default_chapter_count(),
            prior_chapter_excerpts: default_prior_chapter_excerpts(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./output")
}

fn default_chapter_count() -> u32 {
    10
}

fn default_prior_chapter_excerpts() -> usize {
    3
}

fn default_excerpt_chars() -> usize {
    1200
}
