//! regioncache - A lazy-loading chunk cache for region-file backed worlds
//!
//! This library manages a large, sparse grid of fixed-size chunks stored in
//! a small set of multi-record region files, under a strict memory budget.
//! Chunks are loaded transparently by background workers when requested,
//! edited in batches, and written back and released again under
//! caller-driven eviction or memory pressure, so an editor can treat a
//! world of millions of chunks as if it were fully resident.
//!
//! # Modules
//!
//! - [`pos`] - World coordinate, chunk key and in-chunk offset transforms
//! - [`chunk`] - The in-memory chunk record
//! - [`adapter`] - The region-file adapter trait the cache reads and writes
//!   through
//! - [`cache`] - Cache state, eviction candidacy and the heap guard
//! - [`manager`] - The façade composing the above, its reload worker pool
//!   and the initial loader

pub mod adapter;
pub mod cache;
pub mod chunk;
pub mod manager;
pub mod pos;

pub use adapter::{FilePosition, FileRef, RegionAdapter};
pub use cache::{
    CacheError, EvictableSet, HeapGuard, MemoryProbe, SystemMemoryProbe, MEMORY_PRESSURE_RATIO,
};
pub use chunk::Chunk;
pub use manager::{RegionManager, UpdateListener};
pub use pos::{ChunkKey, InChunkOffset, CHUNK_SIZE};
