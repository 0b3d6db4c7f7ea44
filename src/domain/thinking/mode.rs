//! Thinking modes and per-mode budgets.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;
use crate::domain::pipeline::PipelineStage;

/// Deliberation mode requested by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingMode {
    /// Let the engine pick based on the stage.
    #[default]
    Auto,
    Fast,
    Deep,
}

/// Mode actually used for an invocation. Never `auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedMode {
    Fast,
    Deep,
}

impl ThinkingMode {
    /// Resolves the requested mode for a stage.
    ///
    /// Blueprint and DetailedOutline are structurally demanding and get the
    /// deep mode under `auto`; every other stage gets the fast mode.
    pub fn resolve_for(self, stage: PipelineStage) -> ResolvedMode {
        match self {
            ThinkingMode::Fast => ResolvedMode::Fast,
            ThinkingMode::Deep => ResolvedMode::Deep,
            ThinkingMode::Auto => match stage {
                PipelineStage::Blueprint | PipelineStage::DetailedOutline => ResolvedMode::Deep,
                PipelineStage::WorldState | PipelineStage::CharacterInit | PipelineStage::Ready => {
                    ResolvedMode::Fast
                }
            },
        }
    }
}

impl FromStr for ThinkingMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(ThinkingMode::Auto),
            "fast" => Ok(ThinkingMode::Fast),
            "deep" => Ok(ThinkingMode::Deep),
            other => Err(ValidationError::invalid_format(
                "thinking_mode",
                format!("expected auto, fast or deep, got '{}'", other),
            )),
        }
    }
}

impl ResolvedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedMode::Fast => "fast",
            ResolvedMode::Deep => "deep",
        }
    }
}

impl fmt::Display for ResolvedMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Character caps applied to context before it reaches the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationLimits {
    pub previous_context_chars: usize,
    pub world_context_chars: usize,
}

/// Budget carried by one resolved mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeBudget {
    pub truncation: TruncationLimits,
    /// Minimum number of shots a response must enumerate to pass the gate.
    pub min_shots: u32,
    pub max_tokens: u32,
}

/// Keeps the last `max_chars` characters of `text`.
///
/// Counts Unicode scalar values so CJK text is never split mid-character.
/// A cap of zero disables clipping.
pub fn clip_tail(text: &str, max_chars: usize) -> &str {
    if max_chars == 0 {
        return text;
    }
    let total = text.chars().count();
    if total <= max_chars {
        return text;
    }
    let skip = total - max_chars;
    match text.char_indices().nth(skip) {
        Some((byte_idx, _)) => &text[byte_idx..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_picks_deep_for_structural_stages() {
        assert_eq!(
            ThinkingMode::Auto.resolve_for(PipelineStage::Blueprint),
            ResolvedMode::Deep
        );
        assert_eq!(
            ThinkingMode::Auto.resolve_for(PipelineStage::DetailedOutline),
            ResolvedMode::Deep
        );
    }

    #[test]
    fn auto_picks_fast_for_remaining_stages() {
        assert_eq!(
            ThinkingMode::Auto.resolve_for(PipelineStage::WorldState),
            ResolvedMode::Fast
        );
        assert_eq!(
            ThinkingMode::Auto.resolve_for(PipelineStage::CharacterInit),
            ResolvedMode::Fast
        );
    }

    #[test]
    fn explicit_modes_bypass_heuristic() {
        assert_eq!(
            ThinkingMode::Fast.resolve_for(PipelineStage::Blueprint),
            ResolvedMode::Fast
        );
        assert_eq!(
            ThinkingMode::Deep.resolve_for(PipelineStage::WorldState),
            ResolvedMode::Deep
        );
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Deep ".parse::<ThinkingMode>().unwrap(), ThinkingMode::Deep);
        assert_eq!("AUTO".parse::<ThinkingMode>().unwrap(), ThinkingMode::Auto);
        assert!("turbo".parse::<ThinkingMode>().is_err());
    }

    #[test]
    fn mode_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ResolvedMode::Deep).unwrap(), "\"deep\"");
        assert_eq!(serde_json::to_string(&ThinkingMode::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn clip_tail_keeps_suffix() {
        assert_eq!(clip_tail("abcdef", 3), "def");
        assert_eq!(clip_tail("abc", 10), "abc");
        assert_eq!(clip_tail("", 5), "");
        assert_eq!(clip_tail("abc", 0), "abc");
    }

    #[test]
    fn clip_tail_respects_char_boundaries() {
        assert_eq!(clip_tail("修仙界用代码画符", 4), "代码画符");
    }
}
