use dashmap::DashMap;

use crate::error::BackendError;

/// Key/value cache in front of a store.
///
/// Implementations must tolerate concurrent calls. Entries carry no TTL;
/// they live until removed by key, by prefix or by [`Cache::clear`].
pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<V>, BackendError>;

    /// Insert or overwrite.
    fn put(&self, key: &str, value: V) -> Result<(), BackendError>;

    fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Remove every key starting with `prefix`, returning how many were removed.
    fn remove_by_prefix(&self, prefix: &str) -> Result<usize, BackendError>;

    fn contains_key(&self, key: &str) -> Result<bool, BackendError>;

    fn clear(&self) -> Result<(), BackendError>;
}

/// Process-local cache backed by a sharded concurrent map.
#[derive(Debug)]
pub struct InMemoryCache<V> {
    entries: DashMap<String, V>,
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<V> InMemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Snapshot of the current keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort_unstable();
        keys
    }
}

impl<V: Clone + Send + Sync> Cache<V> for InMemoryCache<V> {
    fn get(&self, key: &str) -> Result<Option<V>, BackendError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    fn put(&self, key: &str, value: V) -> Result<(), BackendError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.entries.remove(key);
        Ok(())
    }

    fn remove_by_prefix(&self, prefix: &str) -> Result<usize, BackendError> {
        let mut removed = 0;
        self.entries.retain(|key, _| {
            let keep = !key.starts_with(prefix);
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }

    fn contains_key(&self, key: &str) -> Result<bool, BackendError> {
        Ok(self.entries.contains_key(key))
    }

    fn clear(&self) -> Result<(), BackendError> {
        self.entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_removal_leaves_other_groups_alone() {
        let cache = InMemoryCache::new();
        cache.put("event:a", 1).unwrap();
        cache.put("event:a:session:1", 2).unwrap();
        cache.put("event:a:session:2", 3).unwrap();
        cache.put("event:b:session:1", 4).unwrap();

        assert_eq!(cache.remove_by_prefix("event:a:").unwrap(), 2);
        assert_eq!(cache.keys(), ["event:a", "event:b:session:1"]);
    }

    #[test]
    fn put_overwrites() {
        let cache = InMemoryCache::new();
        cache.put("user:x", "old").unwrap();
        cache.put("user:x", "new").unwrap();
        assert_eq!(cache.get("user:x").unwrap(), Some("new"));
        assert_eq!(cache.len(), 1);
    }
}
