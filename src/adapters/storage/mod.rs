//! Storage adapters for pipeline artifacts and state.
//!
//! - `FilePipelineStorage` - JSON files, one directory per project
//! - `InMemoryPipelineStorage` - in-memory storage for tests

mod file_pipeline_storage;
mod in_memory_pipeline_storage;

pub use file_pipeline_storage::FilePipelineStorage;
pub use in_memory_pipeline_storage::InMemoryPipelineStorage;
