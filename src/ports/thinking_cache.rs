//! Thinking Cache Port - Bounded store of accepted thinking results.
//!
//! Operations are synchronous: each holds one short critical section and
//! never spans a model call.

use crate::domain::thinking::{RequestFingerprint, ThinkingResult};

/// Port for the process-wide thinking cache.
pub trait ThinkingCache: Send + Sync {
    /// Returns the cached result and marks it most recently used.
    fn get(&self, fingerprint: &RequestFingerprint) -> Option<ThinkingResult>;

    /// Stores a result, evicting the least recently used entry when full.
    fn put(&self, fingerprint: RequestFingerprint, result: ThinkingResult);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;
}
