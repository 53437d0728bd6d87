//! # Sharded Registry
//!
//! Entity map split across independent `parking_lot::Mutex` shards keyed by
//! a hash of the entity ID.
//!
//! Every read-modify-write on one entity holds exactly one shard lock, so
//! operations on unrelated swaps or messages do not serialise. With one shard
//! this degenerates to the single exclusive lock per component.

use crate::domain::EntityId;
use parking_lot::{Mutex, MutexGuard};
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash as StdHash, Hasher};

/// One shard's entities.
pub type Shard<V> = HashMap<EntityId, V>;

/// Hash-sharded entity registry.
pub struct ShardedRegistry<V> {
    shards: Vec<Mutex<Shard<V>>>,
}

impl<V> ShardedRegistry<V> {
    /// Create with `shards` locks (at least one).
    pub fn new(shards: usize) -> Self {
        let shards = (0..shards.max(1))
            .map(|_| Mutex::new(HashMap::new()))
            .collect();
        Self { shards }
    }

    /// Number of shards.
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    fn shard_index(&self, id: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        id.hash(&mut hasher);
        (hasher.finish() % self.shards.len() as u64) as usize
    }

    /// Lock the shard owning `id`. Hold the guard for the whole
    /// read-modify-write.
    pub fn lock_shard(&self, id: &str) -> MutexGuard<'_, Shard<V>> {
        self.shards[self.shard_index(id)].lock()
    }

    /// Total entities across shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    /// True if no shard holds an entity.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(|s| s.lock().is_empty())
    }

    /// IDs of entities matching `predicate`, one shard at a time.
    ///
    /// Not a consistent snapshot: each shard is locked only while scanned.
    pub fn ids_where<F>(&self, predicate: F) -> Vec<EntityId>
    where
        F: Fn(&V) -> bool,
    {
        let mut ids = Vec::new();
        for shard in &self.shards {
            let shard = shard.lock();
            ids.extend(
                shard
                    .iter()
                    .filter(|(_, v)| predicate(v))
                    .map(|(id, _)| id.clone()),
            );
        }
        ids
    }
}

impl<V: Clone> ShardedRegistry<V> {
    /// Clone the entity stored under `id`.
    pub fn get_cloned(&self, id: &str) -> Option<V> {
        self.lock_shard(id).get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let registry: ShardedRegistry<u32> = ShardedRegistry::new(4);
        registry.lock_shard("a").insert("a".to_string(), 1);
        registry.lock_shard("b").insert("b".to_string(), 2);

        assert_eq!(registry.get_cloned("a"), Some(1));
        assert_eq!(registry.get_cloned("c"), None);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_zero_shards_becomes_one() {
        let registry: ShardedRegistry<u32> = ShardedRegistry::new(0);
        assert_eq!(registry.shard_count(), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_ids_where() {
        let registry: ShardedRegistry<u32> = ShardedRegistry::new(8);
        for i in 0..100u32 {
            let id = format!("id-{}", i);
            registry.lock_shard(&id).insert(id.clone(), i);
        }
        let mut even = registry.ids_where(|v| v % 2 == 0);
        even.sort();
        assert_eq!(even.len(), 50);
        assert!(even.contains(&"id-42".to_string()));
    }

    #[test]
    fn test_shard_assignment_is_stable() {
        let registry: ShardedRegistry<u32> = ShardedRegistry::new(16);
        let first = registry.shard_index("swp-abc");
        for _ in 0..10 {
            assert_eq!(registry.shard_index("swp-abc"), first);
        }
    }

    #[test]
    fn test_concurrent_inserts() {
        use std::sync::Arc;
        let registry: Arc<ShardedRegistry<usize>> = Arc::new(ShardedRegistry::new(8));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let id = format!("{}-{}", t, i);
                        registry.lock_shard(&id).insert(id, i);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(registry.len(), 2000);
    }
}
