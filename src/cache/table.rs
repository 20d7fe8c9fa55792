use dashmap::DashMap;

use crate::adapter::{FilePosition, FileRef};
use crate::chunk::Chunk;
use crate::pos::ChunkKey;

/// The cache state of one known chunk key.
///
/// Modelling both states as one entry makes the resident/evicted mutual
/// exclusion structural: a key cannot be in both at once.
#[derive(Debug, Clone)]
pub enum CacheEntry {
    /// The chunk is fully in memory.
    Resident(Chunk),
    /// The chunk's memory was released; enough is remembered to reload it.
    Evicted {
        file: FileRef,
        position: FilePosition,
    },
}

/// Map from chunk key to cache state, shared between the caller's thread,
/// the reload workers and the initial loader.
#[derive(Default)]
pub struct ChunkTable {
    entries: DashMap<ChunkKey, CacheEntry>,
}

impl ChunkTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `chunk` resident, replacing any previous state for its key.
    pub fn promote(&self, chunk: Chunk) {
        self.entries.insert(chunk.key(), CacheEntry::Resident(chunk));
    }

    /// Records an evicted chunk's reload location, replacing any previous
    /// state for the key.
    pub fn insert_ledger(&self, key: ChunkKey, file: FileRef, position: FilePosition) {
        self.entries
            .insert(key, CacheEntry::Evicted { file, position });
    }

    /// Returns a snapshot of the resident chunk at `key`, if any.
    pub fn get_resident(&self, key: ChunkKey) -> Option<Chunk> {
        match self.entries.get(&key).map(|e| e.value().clone()) {
            Some(CacheEntry::Resident(chunk)) => Some(chunk),
            _ => None,
        }
    }

    /// Applies `f` to the resident chunk at `key`. Returns `None` without
    /// calling `f` when the key is not resident.
    pub fn with_resident_mut<R>(&self, key: ChunkKey, f: impl FnOnce(&mut Chunk) -> R) -> Option<R> {
        match self.entries.get_mut(&key).as_deref_mut() {
            Some(CacheEntry::Resident(chunk)) => Some(f(chunk)),
            _ => None,
        }
    }

    /// Removes and returns the resident chunk at `key`.
    ///
    /// The key is absent until the caller re-inserts it (ledgered after a
    /// flush, or resident again if the flush failed).
    pub fn take_resident(&self, key: ChunkKey) -> Option<Chunk> {
        let (_, entry) = self
            .entries
            .remove_if(&key, |_, e| matches!(e, CacheEntry::Resident(_)))?;
        match entry {
            CacheEntry::Resident(chunk) => Some(chunk),
            CacheEntry::Evicted { .. } => None,
        }
    }

    /// Returns the reload location of the evicted chunk at `key`, if any.
    pub fn lookup_ledger(&self, key: ChunkKey) -> Option<(FileRef, FilePosition)> {
        match self.entries.get(&key).as_deref() {
            Some(CacheEntry::Evicted { file, position }) => Some((file.clone(), *position)),
            _ => None,
        }
    }

    pub fn is_resident(&self, key: ChunkKey) -> bool {
        matches!(
            self.entries.get(&key).as_deref(),
            Some(CacheEntry::Resident(_))
        )
    }

    pub fn resident_keys(&self) -> Vec<ChunkKey> {
        self.entries
            .iter()
            .filter(|e| matches!(e.value(), CacheEntry::Resident(_)))
            .map(|e| *e.key())
            .collect()
    }

    pub fn ledger_keys(&self) -> Vec<ChunkKey> {
        self.entries
            .iter()
            .filter(|e| matches!(e.value(), CacheEntry::Evicted { .. }))
            .map(|e| *e.key())
            .collect()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
