//! Pipeline domain - Stages, artifacts and per-project state.
//!
//! A project moves linearly through Blueprint, DetailedOutline, WorldState
//! and CharacterInit to Ready. Each producing stage leaves one artifact.

mod artifact;
mod stage;
mod state;

pub use artifact::{Artifact, ArtifactDocument, ArtifactRef};
pub use stage::PipelineStage;
pub use state::{resolve_entry_point, AttemptOutcome, ProjectPipelineState, StageAttempt};
