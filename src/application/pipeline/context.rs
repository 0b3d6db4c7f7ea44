//! Project brief and per-stage context assembly.

use serde::{Deserialize, Serialize};

use super::prompts;
use crate::config::PipelineConfig;
use crate::domain::pipeline::{Artifact, PipelineStage};
use crate::domain::skills::{SkillDecision, SkillIntent};
use crate::domain::thinking::{clip_tail, ThinkingMode, ThinkingRequest};

/// Caller input shared by every stage of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBrief {
    pub idea: String,
    pub intent: SkillIntent,
    #[serde(default)]
    pub chapter_count: Option<u32>,
    /// Full text of chapters already written, oldest first.
    #[serde(default)]
    pub prior_chapters: Vec<String>,
    #[serde(default)]
    pub mode: Option<ThinkingMode>,
}

impl ProjectBrief {
    pub fn from_idea(idea: impl Into<String>) -> Self {
        Self {
            idea: idea.into(),
            intent: SkillIntent::OutlineFromIdea,
            chapter_count: None,
            prior_chapters: Vec::new(),
            mode: None,
        }
    }

    pub fn with_chapter_count(mut self, chapter_count: u32) -> Self {
        self.chapter_count = Some(chapter_count);
        self
    }

    pub fn with_prior_chapters(mut self, chapters: Vec<String>) -> Self {
        self.prior_chapters = chapters;
        self
    }

    pub fn with_mode(mut self, mode: ThinkingMode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn with_intent(mut self, intent: SkillIntent) -> Self {
        self.intent = intent;
        self
    }

    pub fn has_prior_chapters(&self) -> bool {
        self.prior_chapters.iter().any(|c| !c.trim().is_empty())
    }
}

/// Quotes the latest prior chapters, each clipped to its tail.
///
/// Chapters keep their position in the full list, so the newest of ten
/// chapters is labelled `【第10章】`.
pub fn chapter_excerpts(chapters: &[String], count: usize, excerpt_chars: usize) -> String {
    let start = chapters.len().saturating_sub(count);
    chapters[start..]
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(offset, text)| {
            format!(
                "【第{}章】\n{}",
                start + offset + 1,
                clip_tail(text.trim(), excerpt_chars)
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Builds the thinking request for one stage.
///
/// `prerequisites` are the stored artifacts the stage reads, in stage order.
/// They are quoted whole; only the chapter excerpts fall under the mode's
/// context budget.
pub fn build_request(
    stage: PipelineStage,
    brief: &ProjectBrief,
    decision: &SkillDecision,
    prerequisites: &[Artifact],
    config: &PipelineConfig,
) -> ThinkingRequest {
    let chapter_count = brief.chapter_count.unwrap_or(config.default_chapter_count);
    let previous = chapter_excerpts(
        &brief.prior_chapters,
        config.prior_chapter_excerpts,
        config.excerpt_chars,
    );
    let artifacts = prerequisites
        .iter()
        .map(|artifact| format!("【{}】\n{}", artifact.stage.display_name(), artifact.document.render()))
        .collect::<Vec<_>>()
        .join("\n\n");

    ThinkingRequest::new(stage, prompts::stage_prompt(stage, &brief.idea, chapter_count))
        .with_system_prompt(prompts::system_prompt(stage, decision))
        .with_artifacts(artifacts)
        .with_previous_context(previous)
}
