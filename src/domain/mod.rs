//! Domain layer containing orchestration types and pure logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, validation errors, state machine trait)
//! - `pipeline` - Stages, artifacts and per-project pipeline state
//! - `skills` - Intents, skill kinds and routing decisions
//! - `thinking` - Modes, budgets, fingerprints and quality gates

pub mod foundation;
pub mod pipeline;
pub mod skills;
pub mod thinking;
