//! Skill routing configuration

use serde::Deserialize;
use std::path::PathBuf;

use super::error::ValidationError;
use crate::domain::skills::SkillKind;

/// Skill routing configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SkillsConfig {
    /// When false every request uses the fallback skill
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Directory holding `<skill>/SKILL.md`
    #[serde(default = "default_skills_dir")]
    pub skills_dir: PathBuf,

    #[serde(default = "default_outline_skill")]
    pub outline_skill: String,

    #[serde(default = "default_continuation_skill")]
    pub continuation_skill: String,

    #[serde(default = "default_rewrite_skill")]
    pub rewrite_skill: String,

    #[serde(default = "default_fallback_skill")]
    pub fallback_skill: String,
}

impl SkillsConfig {
    /// Configured skill name for a kind.
    pub fn skill_name(&self, kind: SkillKind) -> &str {
        match kind {
            SkillKind::Outline => &self.outline_skill,
            SkillKind::Continuation => &self.continuation_skill,
            SkillKind::Rewrite => &self.rewrite_skill,
            SkillKind::Writing => &self.fallback_skill,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let names = [
            ("outline_skill", &self.outline_skill),
            ("continuation_skill", &self.continuation_skill),
            ("rewrite_skill", &self.rewrite_skill),
            ("fallback_skill", &self.fallback_skill),
        ];
        for (field, name) in names {
            if name.trim().is_empty() {
                return Err(ValidationError::EmptySkillName(field));
            }
        }
        Ok(())
    }
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            skills_dir: default_skills_dir(),
            outline_skill: default_outline_skill(),
            continuation_skill: default_continuation_skill(),
            rewrite_skill: default_rewrite_skill(),
            fallback_skill: default_fallback_skill(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_skills_dir() -> PathBuf {
    PathBuf::from("./skills")
}

fn default_outline_skill() -> String {
    "outline-skill".to_string()
}

fn default_continuation_skill() -> String {
    "continuation-skill".to_string()
}

fn default_rewrite_skill() -> String {
    "rewrite-skill".to_string()
}

fn default_fallback_skill() -> String {
    "writing-skill".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skill_names_default() {
        let config = SkillsConfig::default();
        assert!(config.enabled);
        assert_eq!(config.skill_name(SkillKind::Outline), "outline-skill");
        assert_eq!(config.skill_name(SkillKind::Continuation), "continuation-skill");
        assert_eq!(config.skill_name(SkillKind::Rewrite), "rewrite-skill");
        assert_eq!(config.skill_name(SkillKind::Writing), "writing-skill");
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        let config = SkillsConfig {
            rewrite_skill: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::EmptySkillName("rewrite_skill"))
        );
    }
}
