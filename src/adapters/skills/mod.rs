//! Skill reference store adapters.

mod filesystem_skill_store;
mod in_memory_skill_store;

pub use filesystem_skill_store::FilesystemSkillStore;
pub use in_memory_skill_store::InMemorySkillStore;
