use std::collections::HashSet;

use parking_lot::Mutex;

use crate::pos::ChunkKey;

/// Resident keys the caller has marked safe to force out of memory.
///
/// Drains pop one arbitrary key at a time instead of iterating, so the set
/// can be mutated concurrently while a drain is in progress.
#[derive(Default)]
pub struct EvictableSet {
    keys: Mutex<HashSet<ChunkKey>>,
}

impl EvictableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: ChunkKey) {
        self.keys.lock().insert(key);
    }

    /// Removes `key`, returning whether it was in the set.
    pub fn remove(&self, key: ChunkKey) -> bool {
        self.keys.lock().remove(&key)
    }

    pub fn is_empty(&self) -> bool {
        self.keys.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.lock().len()
    }

    /// Removes and returns one arbitrary key.
    pub fn pop(&self) -> Option<ChunkKey> {
        let mut keys = self.keys.lock();
        let key = keys.iter().next().copied()?;
        keys.remove(&key);
        Some(key)
    }

    pub fn clear(&self) {
        self.keys.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_drains_everything_once() {
        let set = EvictableSet::new();
        set.insert(ChunkKey::of(0, 0));
        set.insert(ChunkKey::of(16, 0));
        set.insert(ChunkKey::of(0, 16));
        set.insert(ChunkKey::of(0, 0)); // duplicate

        let mut drained = Vec::new();
        while let Some(key) = set.pop() {
            drained.push(key);
        }
        drained.sort_by_key(|k| (k.x, k.z));

        assert_eq!(
            drained,
            vec![ChunkKey::of(0, 0), ChunkKey::of(0, 16), ChunkKey::of(16, 0)]
        );
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_unmarks() {
        let set = EvictableSet::new();
        set.insert(ChunkKey::of(0, 0));
        set.remove(ChunkKey::of(0, 0));
        assert!(set.pop().is_none());
    }
}
