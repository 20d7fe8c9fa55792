//! The region file adapter surface.
//!
//! Region files are container files holding many chunk payloads. This crate
//! does not parse them; it consumes an implementation of [`RegionAdapter`]
//! that knows the on-disk format and exposes positional reads and writes.
//!
//! [`FileRef`] and [`FilePosition`] are opaque to the cache: it stores them
//! when a chunk is evicted and hands them back unchanged on reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::cache::CacheError;
use crate::pos::ChunkKey;

/// Handle to a container file, created by [`RegionAdapter::for_file`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileRef(Arc<PathBuf>);

impl FileRef {
    pub fn new(path: PathBuf) -> Self {
        Self(Arc::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A chunk's location inside its container file.
///
/// The cache never interprets the value; only the adapter that produced it
/// does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FilePosition(pub u64);

/// Access to chunk payloads stored in region files.
///
/// Implementations may cache per-file state (open handles, headers) keyed by
/// [`FileRef`]; `clear_cache` drops any such state.
///
/// A `read` that cannot allocate its payload buffer should report
/// [`CacheError::AllocationFailed`] so the cache can free evictable chunks
/// and retry, rather than a generic I/O error.
#[async_trait]
pub trait RegionAdapter: Send + Sync + 'static {
    /// Enumerates the chunks stored in `file` as (world key, in-file
    /// position) pairs.
    ///
    /// Payloads are opaque to the cache, so decoding each record's world key
    /// is the adapter's job.
    async fn list_positions(
        &self,
        file: &FileRef,
    ) -> Result<Vec<(ChunkKey, FilePosition)>, CacheError>;

    /// Reads the payload stored at `position`.
    async fn read(&self, file: &FileRef, position: FilePosition) -> Result<Bytes, CacheError>;

    /// Writes `payload` to `position`, replacing the stored record.
    async fn write(
        &self,
        file: &FileRef,
        position: FilePosition,
        payload: &[u8],
    ) -> Result<(), CacheError>;

    /// Returns the handle for the container file at `path`.
    fn for_file(&self, path: &Path) -> FileRef {
        FileRef::new(path.to_path_buf())
    }

    /// Whether `path` names a container file this adapter can open.
    ///
    /// Used by the initial loader to filter directory entries.
    fn is_region_file(&self, path: &Path) -> bool;

    /// Drops any per-file state the adapter has cached.
    fn clear_cache(&self);
}
