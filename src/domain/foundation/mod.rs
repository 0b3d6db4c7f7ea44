//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers and the validation error type that the rest of the
//! domain builds on.

mod errors;
mod ids;

pub use errors::ValidationError;
pub use ids::{AttemptId, ProjectId};
