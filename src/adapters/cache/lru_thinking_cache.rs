//! LRU-backed thinking cache.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};

use crate::domain::thinking::{RequestFingerprint, ThinkingResult};
use crate::ports::ThinkingCache;

/// Bounded least-recently-used cache shared by every pipeline run.
///
/// A single mutex guards the map; each operation is one critical section so
/// concurrent `get`/`put` cannot corrupt recency order.
pub struct LruThinkingCache {
    inner: Mutex<LruCache<RequestFingerprint, ThinkingResult>>,
}

impl LruThinkingCache {
    /// Creates a cache holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    // Poisoning is ignored: entries are immutable values.
    fn lock(&self) -> MutexGuard<'_, LruCache<RequestFingerprint, ThinkingResult>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ThinkingCache for LruThinkingCache {
    fn get(&self, fingerprint: &RequestFingerprint) -> Option<ThinkingResult> {
        self.lock().get(fingerprint).cloned()
    }

    fn put(&self, fingerprint: RequestFingerprint, result: ThinkingResult) {
        if let Some((evicted, _)) = self.lock().push(fingerprint.clone(), result) {
            if evicted != fingerprint {
                tracing::debug!(evicted = %evicted, "thinking cache evicted entry");
            }
        }
    }

    fn len(&self) -> usize {
        self.lock().len()
    }

    fn capacity(&self) -> usize {
        self.lock().cap().get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pipeline::PipelineStage;
    use crate::domain::thinking::{FingerprintInput, ResolvedMode};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn fp(prompt: &str) -> RequestFingerprint {
        RequestFingerprint::compute(FingerprintInput {
            stage: PipelineStage::Blueprint,
            mode: ResolvedMode::Deep,
            system_prompt: "",
            prompt,
            artifacts: "",
            previous_context: "",
            world_context: "",
        })
    }

    fn result(content: &str) -> ThinkingResult {
        ThinkingResult {
            content: content.to_string(),
            mode_used: ResolvedMode::Deep,
            shot_count: 4,
            quality_passed: true,
            retry_count: 0,
        }
    }

    #[test]
    fn test_get_returns_stored_result() {
        let cache = LruThinkingCache::new(2);
        cache.put(fp("a"), result("A"));
        assert_eq!(cache.get(&fp("a")).unwrap().content, "A");
        assert!(cache.get(&fp("missing")).is_none());
    }

    #[test]
    fn test_evicts_least_recently_put() {
        let cache = LruThinkingCache::new(2);
        cache.put(fp("a"), result("A"));
        cache.put(fp("b"), result("B"));
        cache.put(fp("c"), result("C"));
        assert!(cache.get(&fp("a")).is_none());
        assert!(cache.get(&fp("b")).is_some());
        assert!(cache.get(&fp("c")).is_some());
    }

    #[test]
    fn test_get_refreshes_recency() {
        let cache = LruThinkingCache::new(2);
        cache.put(fp("a"), result("A"));
        cache.put(fp("b"), result("B"));
        cache.get(&fp("a"));
        cache.put(fp("c"), result("C"));
        assert!(cache.get(&fp("a")).is_some());
        assert!(cache.get(&fp("b")).is_none());
    }

    #[test]
    fn test_put_existing_key_replaces_without_growing() {
        let cache = LruThinkingCache::new(2);
        cache.put(fp("a"), result("A"));
        cache.put(fp("a"), result("A2"));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&fp("a")).unwrap().content, "A2");
    }

    #[test]
    fn test_zero_capacity_is_raised_to_one() {
        let cache = LruThinkingCache::new(0);
        assert_eq!(cache.capacity(), 1);
        cache.put(fp("a"), result("A"));
        cache.put(fp("b"), result("B"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_access_keeps_bound() {
        let cache = Arc::new(LruThinkingCache::new(8));
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        let key = fp(&format!("{}-{}", t, i));
                        cache.put(key.clone(), result("x"));
                        cache.get(&key);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }

    proptest! {
        #[test]
        fn len_never_exceeds_capacity(capacity in 1usize..10, keys in prop::collection::vec("[a-z]{1,4}", 0..40)) {
            let cache = LruThinkingCache::new(capacity);
            for key in &keys {
                cache.put(fp(key), result(key));
                prop_assert!(cache.len() <= capacity);
            }
        }
    }
}
