//! Exact-text LRU cache for computed embeddings (spec §4.1).

use std::num::NonZeroUsize;

use lru::LruCache;
use parking_lot::Mutex;

const DEFAULT_CAPACITY: usize = 10_000;

/// Thread-safe LRU cache keyed by the exact input text.
pub struct EmbeddingCache {
    inner: Mutex<LruCache<String, Vec<f32>>>,
}

impl EmbeddingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::new(1).unwrap());
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    #[must_use]
    pub fn get(&self, text: &str) -> Option<Vec<f32>> {
        self.inner.lock().get(text).cloned()
    }

    pub fn put(&self, text: String, vector: Vec<f32>) {
        self.inner.lock().put(text, vector);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

impl Default for EmbeddingCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hits_on_exact_text() {
        let cache = EmbeddingCache::new();
        cache.put("hello".to_string(), vec![1.0, 2.0]);
        assert_eq!(cache.get("hello"), Some(vec![1.0, 2.0]));
        assert_eq!(cache.get("other"), None);
    }

    #[test]
    fn evicts_least_recently_used_on_overflow() {
        let cache = EmbeddingCache::with_capacity(2);
        cache.put("a".to_string(), vec![1.0]);
        cache.put("b".to_string(), vec![2.0]);
        cache.put("c".to_string(), vec![3.0]);
        assert_eq!(cache.get("a"), None);
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
        assert_eq!(cache.len(), 2);
    }
}
