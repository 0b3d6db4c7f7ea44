//! In-Memory Skill Store Adapter
//!
//! Holds skill references in memory. Can be switched into an unreadable mode
//! to exercise the router's degradation path.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{SkillReferenceStore, SkillStoreError};

#[derive(Debug, Clone, Default)]
pub struct InMemorySkillStore {
    skills: Arc<RwLock<HashMap<String, Vec<String>>>>,
    unreadable: Arc<AtomicBool>,
}

impl InMemorySkillStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style registration of a skill.
    pub fn with_skill<I, S>(self, name: impl Into<String>, references: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let references = references.into_iter().map(Into::into).collect();
        // The store was just built, so no other handle can hold the lock.
        if let Ok(mut skills) = self.skills.try_write() {
            skills.insert(name.into(), references);
        }
        self
    }

    pub async fn insert_skill(&self, name: impl Into<String>, references: Vec<String>) {
        self.skills.write().await.insert(name.into(), references);
    }

    /// Makes every subsequent load fail as unreadable.
    pub fn set_unreadable(&self, unreadable: bool) {
        self.unreadable.store(unreadable, Ordering::SeqCst);
    }
}

#[async_trait]
impl SkillReferenceStore for InMemorySkillStore {
    async fn load_references(
        &self,
        skill_name: &str,
    ) -> Result<Option<Vec<String>>, SkillStoreError> {
        if self.unreadable.load(Ordering::SeqCst) {
            return Err(SkillStoreError::Unreadable(
                "simulated unreadable store".to_string(),
            ));
        }
        Ok(self.skills.read().await.get(skill_name).cloned())
    }
}
