//! PipelineStage enum representing the five outline pipeline stages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The five ordered stages of the outline pipeline.
///
/// Each non-terminal stage produces one artifact consumed by later stages.
/// `Ready` is terminal and produces nothing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Blueprint,
    DetailedOutline,
    WorldState,
    CharacterInit,
    Ready,
}

impl PipelineStage {
    /// Returns all stages in canonical order.
    pub fn all() -> &'static [PipelineStage] {
        &[
            PipelineStage::Blueprint,
            PipelineStage::DetailedOutline,
            PipelineStage::WorldState,
            PipelineStage::CharacterInit,
            PipelineStage::Ready,
        ]
    }

    /// Returns the stages that produce an artifact, in order.
    pub fn producing() -> &'static [PipelineStage] {
        &Self::all()[..4]
    }

    /// Returns the 0-based index of this stage in the canonical order.
    pub fn order_index(&self) -> usize {
        match self {
            PipelineStage::Blueprint => 0,
            PipelineStage::DetailedOutline => 1,
            PipelineStage::WorldState => 2,
            PipelineStage::CharacterInit => 3,
            PipelineStage::Ready => 4,
        }
    }

    /// Returns the next stage in order, if any.
    pub fn next(&self) -> Option<PipelineStage> {
        Self::all().get(self.order_index() + 1).copied()
    }

    /// Returns true if this stage comes before another in order.
    pub fn is_before(&self, other: &PipelineStage) -> bool {
        self.order_index() < other.order_index()
    }

    /// Returns true for `Ready`, the only stage with no successor.
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Returns true if this stage produces a persisted artifact.
    pub fn produces_artifact(&self) -> bool {
        !matches!(self, PipelineStage::Ready)
    }

    /// Returns this stage and every later stage that produces an artifact.
    ///
    /// These are the artifacts that go stale when this stage is regenerated.
    pub fn with_downstream(&self) -> Vec<PipelineStage> {
        Self::producing()
            .iter()
            .copied()
            .filter(|s| !s.is_before(self))
            .collect()
    }

    /// Artifacts this stage reads as context.
    pub fn required_artifacts(&self) -> &'static [PipelineStage] {
        match self {
            PipelineStage::Blueprint => &[],
            PipelineStage::DetailedOutline => &[PipelineStage::Blueprint],
            PipelineStage::WorldState => {
                &[PipelineStage::Blueprint, PipelineStage::DetailedOutline]
            }
            PipelineStage::CharacterInit => {
                &[PipelineStage::Blueprint, PipelineStage::WorldState]
            }
            PipelineStage::Ready => &[
                PipelineStage::Blueprint,
                PipelineStage::DetailedOutline,
                PipelineStage::WorldState,
                PipelineStage::CharacterInit,
            ],
        }
    }

    /// File name of the persisted artifact, if the stage produces one.
    pub fn artifact_file_name(&self) -> Option<&'static str> {
        match self {
            PipelineStage::Blueprint => Some("story_blueprint.json"),
            PipelineStage::DetailedOutline => Some("detailed_outline.json"),
            PipelineStage::WorldState => Some("world_state.json"),
            PipelineStage::CharacterInit => Some("characters.json"),
            PipelineStage::Ready => None,
        }
    }

    /// Stable snake_case identifier used in fingerprints and file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Blueprint => "blueprint",
            PipelineStage::DetailedOutline => "detailed_outline",
            PipelineStage::WorldState => "world_state",
            PipelineStage::CharacterInit => "character_init",
            PipelineStage::Ready => "ready",
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            PipelineStage::Blueprint => "Blueprint",
            PipelineStage::DetailedOutline => "Detailed Outline",
            PipelineStage::WorldState => "World State",
            PipelineStage::CharacterInit => "Character Init",
            PipelineStage::Ready => "Ready",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
