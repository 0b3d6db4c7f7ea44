//! SkillRouter - Picks the skill whose material is injected into a stage prompt.
//!
//! Routing never fails. A missing or unreadable skill degrades to the
//! fallback skill and the degradation is recorded on the decision.

use std::sync::Arc;

use crate::config::SkillsConfig;
use crate::domain::skills::{
    DegradeReason, SkillDecision, SkillIntent, SkillKind, SkillResolutionDegraded,
};
use crate::ports::{SkillReferenceStore, SkillStoreError};

pub struct SkillRouter {
    store: Arc<dyn SkillReferenceStore>,
    config: SkillsConfig,
}

impl SkillRouter {
    pub fn new(store: Arc<dyn SkillReferenceStore>, config: SkillsConfig) -> Self {
        Self { store, config }
    }

    /// Resolves the skill for an intent.
    ///
    /// `has_prior_chapters` turns outline intents into continuation work.
    pub async fn route(&self, intent: &SkillIntent, has_prior_chapters: bool) -> SkillDecision {
        let fallback = self.config.fallback_skill.as_str();

        if !self.config.enabled {
            tracing::debug!(skill = fallback, "skill routing disabled");
            let references = self.fallback_references().await;
            return SkillDecision {
                skill_name: fallback.to_string(),
                injected_references: references,
                degraded: Some(SkillResolutionDegraded {
                    requested: fallback.to_string(),
                    reason: DegradeReason::Disabled,
                }),
            };
        }

        let kind = SkillKind::for_intent(intent, has_prior_chapters);
        let requested = self.config.skill_name(kind);

        let reason = match self.store.load_references(requested).await {
            Ok(Some(references)) => {
                tracing::debug!(
                    skill = requested,
                    references = references.len(),
                    "skill resolved"
                );
                return SkillDecision {
                    skill_name: requested.to_string(),
                    injected_references: references,
                    degraded: None,
                };
            }
            Ok(None) => DegradeReason::Missing,
            Err(err) => DegradeReason::Unreadable(describe(&err)),
        };

        tracing::warn!(
            requested,
            fallback,
            reason = %reason,
            "skill resolution degraded"
        );

        // The fallback itself failed, so there is nothing left to load.
        let references = if requested == fallback {
            Vec::new()
        } else {
            self.fallback_references().await
        };

        SkillDecision {
            skill_name: fallback.to_string(),
            injected_references: references,
            degraded: Some(SkillResolutionDegraded {
                requested: requested.to_string(),
                reason,
            }),
        }
    }

    async fn fallback_references(&self) -> Vec<String> {
        match self.store.load_references(&self.config.fallback_skill).await {
            Ok(Some(references)) => references,
            Ok(None) => Vec::new(),
            Err(err) => {
                tracing::warn!(
                    skill = %self.config.fallback_skill,
                    error = %err,
                    "fallback skill unreadable"
                );
                Vec::new()
            }
        }
    }
}

fn describe(err: &SkillStoreError) -> String {
    match err {
        SkillStoreError::Unreadable(detail) => detail.clone(),
        SkillStoreError::Malformed { .. } => err.to_string(),
    }
}
