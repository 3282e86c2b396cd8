//! L1 working tier: an in-process, TTL+LRU map of ephemeral session memories
//! (spec §4.2). Purely in-memory — no I/O, so no `StorageError` path exists here.

use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use crate::types::{now_ms, Memory, MemoryType, Metadata};

const DEFAULT_MAX_SIZE: usize = 1000;

struct Entry {
    memory: Memory,
    expires_at: i64,
}

/// The working tier. Cheap to clone (an `Arc` around the mutex-guarded map), so it
/// can be shared with a background sweep task.
#[derive(Clone)]
pub struct WorkingTier {
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    entries: HashMap<String, Entry>,
    max_size: usize,
}

impl WorkingTier {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_SIZE)
    }

    #[must_use]
    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                max_size,
            })),
        }
    }

    /// Store a memory with the given TTL in seconds, evicting the oldest-accessed
    /// entry first if the tier is already at capacity.
    pub fn store(
        &self,
        content: String,
        memory_type: MemoryType,
        metadata: Metadata,
        tags: BTreeSet<String>,
        ttl_secs: u64,
    ) -> Memory {
        let memory = Memory::new(
            memory_type,
            crate::types::Tier::L1,
            content,
            tags,
            metadata,
            Some(ttl_secs),
        );
        let expires_at = memory.created_at + (ttl_secs as i64) * 1000;

        let mut inner = self.inner.lock();
        if inner.entries.len() >= inner.max_size {
            inner.evict_oldest();
        }
        inner.entries.insert(
            memory.id.clone(),
            Entry {
                memory: memory.clone(),
                expires_at,
            },
        );
        memory
    }

    /// Fetch a memory by id, bumping its access bookkeeping. Expired entries are
    /// purged on access and treated as absent.
    pub fn get(&self, id: &str) -> Option<Memory> {
        let mut inner = self.inner.lock();
        let now = now_ms();
        let expired = inner.entries.get(id).is_some_and(|e| e.expires_at < now);
        if expired {
            inner.entries.remove(id);
            return None;
        }
        let entry = inner.entries.get_mut(id)?;
        entry.memory.touch();
        Some(entry.memory.clone())
    }

    /// All non-expired entries, eagerly purging expired ones in the process.
    pub fn get_all(&self) -> Vec<Memory> {
        let mut inner = self.inner.lock();
        let now = now_ms();
        inner.entries.retain(|_, e| e.expires_at >= now);
        inner.entries.values().map(|e| e.memory.clone()).collect()
    }

    pub fn delete(&self, id: &str) -> bool {
        self.inner.lock().entries.remove(id).is_some()
    }

    /// Membership check with no access-bookkeeping side effects, used by the
    /// orchestrator to locate which tier owns a memory before acting on it.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        let mut inner = self.inner.lock();
        let now = now_ms();
        match inner.entries.get(id) {
            Some(entry) if entry.expires_at >= now => true,
            Some(_) => {
                inner.entries.remove(id);
                false
            }
            None => false,
        }
    }

    /// Bump access bookkeeping without returning the memory.
    pub fn touch(&self, id: &str) -> bool {
        let mut inner = self.inner.lock();
        if let Some(entry) = inner.entries.get_mut(id) {
            entry.memory.touch();
            true
        } else {
            false
        }
    }

    pub fn clear(&self) {
        self.inner.lock().entries.clear();
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Remove all expired entries now, without waiting for the next access.
    pub fn sweep_expired(&self) -> usize {
        let mut inner = self.inner.lock();
        let now = now_ms();
        let before = inner.entries.len();
        inner.entries.retain(|_, e| e.expires_at >= now);
        before - inner.entries.len()
    }

    /// Spawn a background task that calls `sweep_expired` on an interval, returning
    /// a handle the caller should abort on engine shutdown.
    #[must_use]
    pub fn spawn_sweeper(&self, interval: Duration) -> tokio::task::JoinHandle<()> {
        let tier = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let removed = tier.sweep_expired();
                if removed > 0 {
                    tracing::debug!(removed, "L1 sweep removed expired memories");
                }
            }
        })
    }
}

impl Default for WorkingTier {
    fn default() -> Self {
        Self::new()
    }
}

impl Inner {
    /// Evict the entry with the oldest `lastAccessedAt`, breaking ties on the
    /// lexicographically smaller id (spec §4.2).
    fn evict_oldest(&mut self) {
        let oldest_id = self
            .entries
            .iter()
            .map(|(id, e)| (e.memory.last_accessed_at.unwrap_or(e.memory.created_at), id.clone()))
            .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
            .map(|(_, id)| id);
        if let Some(id) = oldest_id {
            self.entries.remove(&id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta() -> Metadata {
        Metadata::default()
    }

    #[test]
    fn store_and_get_roundtrip() {
        let tier = WorkingTier::new();
        let memory = tier.store(
            "remember to refactor".to_string(),
            MemoryType::Scratchpad,
            meta(),
            BTreeSet::new(),
            3600,
        );
        let fetched = tier.get(&memory.id).unwrap();
        assert_eq!(fetched.content, "remember to refactor");
        assert_eq!(fetched.access_count, 1);
    }

    #[test]
    fn expired_entries_are_not_observable() {
        let tier = WorkingTier::new();
        let memory = tier.store(
            "short lived".to_string(),
            MemoryType::Scratchpad,
            meta(),
            BTreeSet::new(),
            0,
        );
        std::thread::sleep(Duration::from_millis(5));
        assert!(tier.get(&memory.id).is_none());
    }

    #[test]
    fn eviction_prefers_oldest_access_then_smallest_id() {
        let tier = WorkingTier::with_max_size(2);
        let a = tier.store("a".to_string(), MemoryType::Scratchpad, meta(), BTreeSet::new(), 3600);
        std::thread::sleep(Duration::from_millis(2));
        let _b = tier.store("b".to_string(), MemoryType::Scratchpad, meta(), BTreeSet::new(), 3600);
        // Neither has been accessed since insertion; `a` is older, so it's evicted.
        let _c = tier.store("c".to_string(), MemoryType::Scratchpad, meta(), BTreeSet::new(), 3600);
        assert!(tier.get(&a.id).is_none());
        assert_eq!(tier.size(), 2);
    }

    #[test]
    fn delete_and_clear() {
        let tier = WorkingTier::new();
        let memory = tier.store("x".to_string(), MemoryType::Scratchpad, meta(), BTreeSet::new(), 3600);
        assert!(tier.delete(&memory.id));
        assert!(tier.get(&memory.id).is_none());
        tier.store("y".to_string(), MemoryType::Scratchpad, meta(), BTreeSet::new(), 3600);
        tier.clear();
        assert_eq!(tier.size(), 0);
    }
}
