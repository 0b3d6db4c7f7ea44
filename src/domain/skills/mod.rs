//! Skills domain - Intents, skill kinds and routing decisions.

mod decision;
mod intent;

pub use decision::{DegradeReason, SkillDecision, SkillResolutionDegraded};
pub use intent::{SkillIntent, SkillKind};
