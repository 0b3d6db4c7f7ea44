//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the orchestration core to external systems:
//! - `cache` - Thinking cache implementations (LRU, no-op)
//! - `model` - Language model providers (OpenAI-compatible HTTP, mock)
//! - `skills` - Skill reference stores (filesystem, in-memory)
//! - `storage` - Pipeline storage (files, in-memory)

pub mod cache;
pub mod model;
pub mod skills;
pub mod storage;

pub use cache::{LruThinkingCache, NoOpThinkingCache};
pub use model::{MockModelProvider, OpenAiCompatibleConfig, OpenAiCompatibleProvider};
pub use skills::{FilesystemSkillStore, InMemorySkillStore};
pub use storage::{FilePipelineStorage, InMemoryPipelineStorage};
