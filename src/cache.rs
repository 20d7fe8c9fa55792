//! Cache state and memory-pressure handling.
//!
//! # Overview
//!
//! The cache side of the crate has three components:
//!
//! - [`ChunkTable`] - The single map from chunk key to cache state. A key is
//!   either resident (the chunk is in memory) or evicted (only its location
//!   in a region file is remembered), never both.
//! - [`EvictableSet`] - Resident keys the caller has marked safe to force
//!   out of memory. Candidacy is caller-asserted (typically visibility
//!   driven), not access-order driven; this is not an LRU.
//! - [`HeapGuard`] - The soft/hard memory-pressure check consulted before
//!   every payload read, with a "friendly" fallback latch for the case where
//!   memory is low but nothing can be evicted.
//!
//! # Memory pressure
//!
//! The guard raises an early-warning [`CacheError::SoftLimit`] when the host
//! free/max memory ratio drops to the pressure threshold, well before a real
//! allocation failure. The reload path reacts by evicting every evictable
//! chunk and retrying. When nothing is evictable the guard is relaxed so the
//! allocation is attempted for real; only a genuine allocation failure with
//! nothing left to evict is fatal.

mod error;
mod evictable;
mod heap_guard;
mod table;

pub use error::CacheError;
pub use evictable::EvictableSet;
pub use heap_guard::{HeapGuard, MemoryProbe, SystemMemoryProbe, MEMORY_PRESSURE_RATIO};
pub use table::{CacheEntry, ChunkTable};
