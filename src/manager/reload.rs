//! The reload queue and its worker pool.
//!
//! Reload requests land in a shared pending set drained by a fixed pool of
//! background tasks. There is no ordering guarantee: any worker may pick any
//! pending key. Requests for a key already pending collapse into one.

use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use super::facade::Inner;
use crate::cache::CacheError;
use crate::chunk::Chunk;
use crate::pos::ChunkKey;

/// Pending reload requests.
///
/// The semaphore carries one permit per pending key; its blocking acquire is
/// the workers' suspension point.
pub(super) struct ReloadQueue {
    pending: Mutex<HashSet<ChunkKey>>,
    ready: Semaphore,
}

impl ReloadQueue {
    pub(super) fn new() -> Self {
        Self {
            pending: Mutex::new(HashSet::new()),
            ready: Semaphore::new(0),
        }
    }

    /// Queues `key`. Returns `false` when it was already pending.
    pub(super) fn request(&self, key: ChunkKey) -> bool {
        let inserted = self.pending.lock().insert(key);
        if inserted {
            self.ready.add_permits(1);
        }
        inserted
    }

    /// Waits for a pending key and removes it. Returns `None` only if the
    /// queue is closed.
    pub(super) async fn next(&self) -> Option<ChunkKey> {
        loop {
            match self.ready.acquire().await {
                Ok(permit) => permit.forget(),
                Err(_) => return None,
            }
            let mut pending = self.pending.lock();
            if let Some(key) = pending.iter().next().copied() {
                pending.remove(&key);
                return Some(key);
            }
        }
    }

    pub(super) fn len(&self) -> usize {
        self.pending.lock().len()
    }

    /// Discards every pending key. Permits already handed out for the
    /// discarded keys are absorbed by the retry loop in [`next`].
    ///
    /// [`next`]: ReloadQueue::next
    pub(super) fn clear(&self) {
        self.pending.lock().clear();
    }
}

/// One worker task: drain the queue forever.
///
/// A failed reload leaves the key ledgered so the caller can request it
/// again; the worker logs and moves on.
pub(super) async fn run_worker(inner: Arc<Inner>) {
    while let Some(key) = inner.queue.next().await {
        match reload_one(&inner, key).await {
            Ok(()) => inner.listener.something_changed(),
            Err(err) => tracing::warn!("reload of chunk {} failed: {}", key, err),
        }
    }
}

/// Promotes one ledgered chunk to resident, resolving memory pressure along
/// the way.
///
/// On a soft-limit warning or a genuine allocation failure: while evictable
/// chunks exist, re-arm the guard, notify the listener and evict them, then
/// retry. With nothing evictable, a soft limit relaxes the guard so the
/// allocation is attempted for real; a genuine failure is fatal.
async fn reload_one(inner: &Inner, key: ChunkKey) -> Result<(), CacheError> {
    loop {
        match try_reload(inner, key).await {
            Ok(()) => return Ok(()),
            Err(err @ (CacheError::SoftLimit | CacheError::AllocationFailed)) => {
                if !inner.evictable.is_empty() {
                    inner.guard.rearm();
                    inner.listener.memory_panic();
                    // The callback is synchronous and cannot await the
                    // eviction, so the worker drains here before retrying.
                    inner.drain_evictable().await?;
                } else if matches!(err, CacheError::SoftLimit) {
                    tracing::debug!("memory pressure with nothing evictable, relaxing heap guard");
                    inner.guard.relax();
                } else {
                    return Err(CacheError::FatalAllocation);
                }
            }
            Err(err) => return Err(err),
        }
    }
}

async fn try_reload(inner: &Inner, key: ChunkKey) -> Result<(), CacheError> {
    inner.guard.check()?;
    let generation = inner.generation.load(Ordering::SeqCst);
    let Some((file, position)) = inner.table.lookup_ledger(key) else {
        // Already resident or never discovered; nothing to do.
        return Ok(());
    };
    let payload = inner.adapter.read(&file, position).await?;

    // The index may have been replaced while the payload was in flight; a
    // promote would resurrect a chunk from the superseded folder.
    let _guard = inner.loader_lock.lock();
    if !inner.is_current(generation) {
        return Ok(());
    }
    inner.table.promote(Chunk::new(key, file, position, payload));
    Ok(())
}
