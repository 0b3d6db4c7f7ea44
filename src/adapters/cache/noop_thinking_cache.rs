//! Cache that stores nothing, for runs with caching disabled.

use crate::domain::thinking::{RequestFingerprint, ThinkingResult};
use crate::ports::ThinkingCache;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpThinkingCache;

impl ThinkingCache for NoOpThinkingCache {
    fn get(&self, _fingerprint: &RequestFingerprint) -> Option<ThinkingResult> {
        None
    }

    fn put(&self, _fingerprint: RequestFingerprint, _result: ThinkingResult) {}

    fn len(&self) -> usize {
        0
    }

    fn capacity(&self) -> usize {
        0
    }
}
