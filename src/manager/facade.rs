use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use super::edit::EditBatch;
use super::loader;
use super::reload::{self, ReloadQueue};
use crate::adapter::RegionAdapter;
use crate::cache::{CacheError, ChunkTable, EvictableSet, HeapGuard, MemoryProbe, SystemMemoryProbe};
use crate::chunk::Chunk;
use crate::pos::{ChunkKey, InChunkOffset};

/// Callbacks fired by the cache.
///
/// Both are invoked synchronously from whichever task completed the
/// triggering step, so implementations must be thread-safe or redispatch
/// internally.
pub trait UpdateListener: Send + Sync {
    /// Fired after a chunk changes state or an initial-scan file completes,
    /// for redraw purposes.
    fn something_changed(&self);

    /// Fired when a reload hit memory pressure and needs evictable chunks
    /// released. The worker drains the evictable set itself after this
    /// returns; the callback exists so the caller can widen the set or
    /// update its UI.
    fn memory_panic(&self);
}

pub(super) struct Inner {
    pub(super) adapter: Arc<dyn RegionAdapter>,
    pub(super) listener: Arc<dyn UpdateListener>,
    pub(super) table: ChunkTable,
    pub(super) evictable: EvictableSet,
    pub(super) guard: HeapGuard,
    pub(super) queue: ReloadQueue,
    pub(super) edits: EditBatch,
    pub(super) generation: AtomicU64,
    pub(super) loader_lock: Mutex<()>,
}

impl Inner {
    pub(super) fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// Releases the resident chunk at `key`, writing it back first when
    /// dirty, and records its reload location.
    ///
    /// On a write failure the chunk is restored resident, along with its
    /// evictable marking, and the error propagates so a later attempt can
    /// retry the flush.
    pub(super) async fn unload(&self, key: ChunkKey) -> Result<(), CacheError> {
        let Some(chunk) = self.table.take_resident(key) else {
            return Ok(());
        };
        let was_evictable = self.evictable.remove(key);
        if chunk.is_dirty() {
            let written = self
                .adapter
                .write(chunk.file(), chunk.position(), chunk.payload())
                .await;
            if let Err(err) = written {
                self.table.promote(chunk);
                if was_evictable {
                    self.evictable.insert(key);
                }
                return Err(err);
            }
        }
        self.table
            .insert_ledger(key, chunk.file().clone(), chunk.position());
        Ok(())
    }

    /// Unloads every currently evictable chunk, one at a time. A key whose
    /// flush fails goes back into the set so the drain can be retried.
    pub(super) async fn drain_evictable(&self) -> Result<(), CacheError> {
        while let Some(key) = self.evictable.pop() {
            if let Err(err) = self.unload(key).await {
                self.evictable.insert(key);
                return Err(err);
            }
        }
        Ok(())
    }
}

/// The region cache façade.
///
/// Composes the chunk table, eviction set, heap guard, reload worker pool,
/// initial loader and edit batching behind the public operations. Constructed
/// inside a tokio runtime; construction spawns the worker pool.
pub struct RegionManager {
    pub(super) inner: Arc<Inner>,
}

impl RegionManager {
    /// Creates a manager probing the host's real memory counters.
    pub fn new(adapter: Arc<dyn RegionAdapter>, listener: Arc<dyn UpdateListener>) -> Arc<Self> {
        Self::with_memory_probe(adapter, listener, Box::new(SystemMemoryProbe::new()))
    }

    /// Creates a manager with a caller-supplied memory probe.
    pub fn with_memory_probe(
        adapter: Arc<dyn RegionAdapter>,
        listener: Arc<dyn UpdateListener>,
        probe: Box<dyn MemoryProbe>,
    ) -> Arc<Self> {
        let inner = Arc::new(Inner {
            adapter,
            listener,
            table: ChunkTable::new(),
            evictable: EvictableSet::new(),
            guard: HeapGuard::new(probe),
            queue: ReloadQueue::new(),
            edits: EditBatch::new(),
            generation: AtomicU64::new(0),
            loader_lock: Mutex::new(()),
        });

        let workers = worker_count();
        tracing::debug!("starting {} chunk reload workers", workers);
        for _ in 0..workers {
            tokio::spawn(reload::run_worker(inner.clone()));
        }

        Arc::new(Self { inner })
    }

    /// Replaces the cache contents with the region files found in `folder`.
    ///
    /// Runs in the background; a previous load still in flight is superseded
    /// and stops at its next checkpoint. The listener is notified as files
    /// are indexed.
    pub fn set_folder(&self, folder: impl Into<PathBuf>) {
        let folder = folder.into();
        let generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let inner = self.inner.clone();
        tokio::spawn(async move {
            if let Err(err) = loader::run(inner, &folder, generation).await {
                tracing::warn!("initial load of {} failed: {}", folder.display(), err);
            }
        });
    }

    /// Returns a snapshot of the chunk at `key` if it is resident.
    ///
    /// Never blocks or loads; request a reload and wait for a
    /// `something_changed` notification when this returns `None`.
    pub fn get_chunk(&self, key: ChunkKey) -> Option<Chunk> {
        self.inner.table.get_resident(key)
    }

    /// Queues `key` for background promotion to resident. Requests for a key
    /// already queued collapse into one.
    pub fn request_reload(&self, key: ChunkKey) {
        self.inner.queue.request(key);
    }

    /// Applies `f` to the resident chunk at `key`, marks it dirty and
    /// records it for the next flush.
    ///
    /// The chunk must already be resident; reloading first is the caller's
    /// responsibility.
    pub fn edit<F>(&self, key: ChunkKey, offset: InChunkOffset, f: F) -> Result<(), CacheError>
    where
        F: FnOnce(&mut Chunk, InChunkOffset),
    {
        let applied = self.inner.table.with_resident_mut(key, |chunk| {
            f(chunk, offset);
            chunk.mark_dirty();
        });
        match applied {
            Some(()) => {
                self.inner.edits.record(key);
                Ok(())
            }
            None => Err(CacheError::NotResident(key)),
        }
    }

    /// Toggles multi-edit mode. While enabled, [`edit_finished`] calls are
    /// no-ops; disabling flushes immediately.
    ///
    /// [`edit_finished`]: RegionManager::edit_finished
    pub async fn set_multi_edit(&self, multi: bool) -> Result<(), CacheError> {
        self.inner.edits.set_multi(multi);
        if multi {
            Ok(())
        } else {
            self.edit_finished().await
        }
    }

    /// Flushes every chunk edited since the last flush, writing dirty
    /// payloads back and re-ledgering them. No-op in multi-edit mode or when
    /// nothing was edited.
    pub async fn edit_finished(&self) -> Result<(), CacheError> {
        if self.inner.edits.is_multi() {
            return Ok(());
        }
        let keys = self.inner.edits.drain();
        for (i, key) in keys.iter().enumerate() {
            if let Err(err) = self.inner.unload(*key).await {
                // Keep the unflushed keys pending so the flush can be retried.
                for k in &keys[i..] {
                    self.inner.edits.record(*k);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Marks a resident chunk as safe to force out of memory. Ignored for
    /// keys that are not currently resident.
    pub fn mark_evictable(&self, key: ChunkKey) {
        if self.inner.table.is_resident(key) {
            self.inner.evictable.insert(key);
        }
    }

    /// Pins a chunk, removing it from the evictable set.
    pub fn mark_pinned(&self, key: ChunkKey) {
        self.inner.evictable.remove(key);
    }

    /// Unloads every chunk currently marked evictable.
    pub async fn drain_all_evictable(&self) -> Result<(), CacheError> {
        self.inner.drain_evictable().await
    }

    pub fn list_resident_keys(&self) -> Vec<ChunkKey> {
        self.inner.table.resident_keys()
    }

    pub fn list_ledger_keys(&self) -> Vec<ChunkKey> {
        self.inner.table.ledger_keys()
    }
}

pub(super) fn worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .max(2)
}
