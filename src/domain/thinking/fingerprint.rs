//! Request fingerprints used as thinking cache keys.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use super::mode::ResolvedMode;
use crate::domain::pipeline::PipelineStage;

/// Deterministic key for a thinking request.
///
/// Rendered as `"{stage}:{mode}:{sha256}"` so keys stay readable in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestFingerprint(String);

/// The semantic inputs of a fingerprint.
///
/// Context slices must already be clipped to the mode budget so that two
/// requests differing only in text the model never sees share a key.
#[derive(Debug, Clone, Copy)]
pub struct FingerprintInput<'a> {
    pub stage: PipelineStage,
    pub mode: ResolvedMode,
    pub system_prompt: &'a str,
    pub prompt: &'a str,
    pub artifacts: &'a str,
    pub previous_context: &'a str,
    pub world_context: &'a str,
}

impl RequestFingerprint {
    /// Computes the fingerprint for a request.
    pub fn compute(input: FingerprintInput<'_>) -> Self {
        // serde_json::Map is ordered by key, so the encoding is canonical.
        let payload = serde_json::json!({
            "stage": input.stage.as_str(),
            "mode": input.mode.as_str(),
            "system_prompt": normalize(input.system_prompt),
            "prompt": normalize(input.prompt),
            "artifacts": normalize(input.artifacts),
            "previous_context": normalize(input.previous_context),
            "world_context": normalize(input.world_context),
        });
        let digest = Sha256::digest(payload.to_string().as_bytes());
        Self(format!(
            "{}:{}:{:x}",
            input.stage.as_str(),
            input.mode.as_str(),
            digest
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Collapses whitespace runs (including CRLF) to one space and trims.
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
