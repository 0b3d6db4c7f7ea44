//! Routing decisions and degradation records.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the router fell back to the general skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DegradeReason {
    /// No material exists for the requested skill.
    Missing,
    /// The skill store could not be read.
    Unreadable(String),
    /// Routing is switched off in configuration.
    Disabled,
}

impl fmt::Display for DegradeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DegradeReason::Missing => f.write_str("skill material missing"),
            DegradeReason::Unreadable(detail) => write!(f, "skill store unreadable: {}", detail),
            DegradeReason::Disabled => f.write_str("skill routing disabled"),
        }
    }
}

/// Record of a routing degradation. A value, never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillResolutionDegraded {
    pub requested: String,
    pub reason: DegradeReason,
}

/// The skill picked for one stage invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillDecision {
    pub skill_name: String,
    /// Reference fragments in injection order.
    pub injected_references: Vec<String>,
    pub degraded: Option<SkillResolutionDegraded>,
}

impl SkillDecision {
    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }

    /// Joins the references into one prompt section.
    pub fn reference_block(&self) -> String {
        self.injected_references.join("\n\n")
    }
}
