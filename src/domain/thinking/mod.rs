//! Thinking domain - Modes, budgets, fingerprints and quality gates.
//!
//! Pure types and functions used by the thinking engine service. Nothing in
//! here performs I/O.

mod errors;
mod fingerprint;
mod mode;
mod quality;
mod response;
mod result;

pub use errors::ThinkingError;
pub use fingerprint::{normalize, FingerprintInput, RequestFingerprint};
pub use mode::{clip_tail, ModeBudget, ResolvedMode, ThinkingMode, TruncationLimits};
pub use quality::{evaluate, Candidate, QualityGate, RequiredFieldsGate, ShotCountGate, Shortfall};
pub use response::{count_shots, extract_json_object, SHOT_KEYS};
pub use result::{ThinkingOutcome, ThinkingRequest, ThinkingResult};
