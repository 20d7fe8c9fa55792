use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::pos::ChunkKey;

/// Keys edited since the last flush, plus the multi-edit latch.
///
/// A broad operation such as a wide paint stroke touches many positions in
/// the same chunks; batching the flush avoids writing and re-ledgering each
/// chunk once per touched position.
#[derive(Default)]
pub(super) struct EditBatch {
    edited: Mutex<HashSet<ChunkKey>>,
    multi: AtomicBool,
}

impl EditBatch {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn record(&self, key: ChunkKey) {
        self.edited.lock().insert(key);
    }

    pub(super) fn drain(&self) -> Vec<ChunkKey> {
        self.edited.lock().drain().collect()
    }

    pub(super) fn set_multi(&self, multi: bool) {
        self.multi.store(multi, Ordering::Release);
    }

    pub(super) fn is_multi(&self) -> bool {
        self.multi.load(Ordering::Acquire)
    }

    pub(super) fn clear(&self) {
        self.edited.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_dedupes() {
        let batch = EditBatch::new();
        batch.record(ChunkKey::of(0, 0));
        batch.record(ChunkKey::of(0, 0));
        batch.record(ChunkKey::of(16, 0));
        assert_eq!(batch.drain().len(), 2);
        assert!(batch.drain().is_empty());
    }

    #[test]
    fn test_multi_latch() {
        let batch = EditBatch::new();
        assert!(!batch.is_multi());
        batch.set_multi(true);
        assert!(batch.is_multi());
        batch.set_multi(false);
        assert!(!batch.is_multi());
    }
}
