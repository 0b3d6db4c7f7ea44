//! Skill Reference Store Port - Interface for loading skill material.

use async_trait::async_trait;

/// Errors reading the skill store.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillStoreError {
    #[error("skill store unreadable: {0}")]
    Unreadable(String),

    #[error("malformed skill '{skill}': {reason}")]
    Malformed { skill: String, reason: String },
}

/// Port for loading the reference fragments of a skill.
#[async_trait]
pub trait SkillReferenceStore: Send + Sync {
    /// Returns the ordered references of `skill_name`, `None` if the skill
    /// does not exist.
    async fn load_references(
        &self,
        skill_name: &str,
    ) -> Result<Option<Vec<String>>, SkillStoreError>;
}
