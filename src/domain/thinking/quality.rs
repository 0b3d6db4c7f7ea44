//! Quality gates applied to model responses before they are accepted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::response::count_shots;

/// Why a response did not meet the quality bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shortfall {
    /// Fewer shots than the mode requires.
    TooFewShots { found: u32, required: u32 },
    /// No JSON object could be extracted.
    Unparseable { detail: String },
    /// Rejected by an additional gate.
    Custom { gate: String, reason: String },
}

impl fmt::Display for Shortfall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shortfall::TooFewShots { found, required } => {
                write!(f, "only {} shots enumerated, at least {} required", found, required)
            }
            Shortfall::Unparseable { detail } => {
                write!(f, "response is not a JSON object: {}", detail)
            }
            Shortfall::Custom { gate, reason } => write!(f, "{} gate: {}", gate, reason),
        }
    }
}

/// A parsed response offered to the gates.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub document: &'a Value,
    pub shot_count: u32,
    pub min_shots: u32,
}

/// Additional acceptance check for a parsed response.
pub trait QualityGate: Send + Sync {
    /// Short identifier used in shortfall records.
    fn name(&self) -> &str;

    fn check(&self, candidate: &Candidate<'_>) -> Result<(), Shortfall>;
}

/// The hard shot-count gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShotCountGate;

impl QualityGate for ShotCountGate {
    fn name(&self) -> &str {
        "shot_count"
    }

    fn check(&self, candidate: &Candidate<'_>) -> Result<(), Shortfall> {
        if candidate.shot_count < candidate.min_shots {
            Err(Shortfall::TooFewShots {
                found: candidate.shot_count,
                required: candidate.min_shots,
            })
        } else {
            Ok(())
        }
    }
}

/// A gate that rejects documents missing any of the listed top-level keys.
#[derive(Debug, Clone)]
pub struct RequiredFieldsGate {
    fields: Vec<String>,
}

impl RequiredFieldsGate {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

impl QualityGate for RequiredFieldsGate {
    fn name(&self) -> &str {
        "required_fields"
    }

    fn check(&self, candidate: &Candidate<'_>) -> Result<(), Shortfall> {
        let missing: Vec<&str> = self
            .fields
            .iter()
            .filter(|field| candidate.document.get(field.as_str()).is_none())
            .map(String::as_str)
            .collect();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Shortfall::Custom {
                gate: self.name().to_string(),
                reason: format!("missing fields: {}", missing.join(", ")),
            })
        }
    }
}

/// Builds a candidate from a document and runs every gate in order.
///
/// Returns the shot count on success and the first shortfall otherwise.
pub fn evaluate(
    document: &Value,
    min_shots: u32,
    gates: &[Box<dyn QualityGate>],
) -> Result<u32, Shortfall> {
    let candidate = Candidate {
        document,
        shot_count: count_shots(document),
        min_shots,
    };
    for gate in gates {
        gate.check(&candidate)?;
    }
    Ok(candidate.shot_count)
}
