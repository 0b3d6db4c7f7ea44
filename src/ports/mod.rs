//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the orchestration core and the outside world. Adapters implement these ports.
//!
//! - `ModelProvider` - Language model invocation
//! - `PipelineStorage` - Artifact and pipeline state persistence
//! - `SkillReferenceStore` - Skill reference material
//! - `ThinkingCache` - Process-wide cache of accepted thinking results

mod model_provider;
mod pipeline_storage;
mod skill_reference_store;
mod thinking_cache;

pub use model_provider::{InvocationConfig, ModelInvocationError, ModelPrompt, ModelProvider};
pub use pipeline_storage::{PipelineStorage, StorageError};
pub use skill_reference_store::{SkillReferenceStore, SkillStoreError};
pub use thinking_cache::ThinkingCache;
