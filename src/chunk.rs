use bytes::Bytes;

use crate::adapter::{FilePosition, FileRef};
use crate::pos::ChunkKey;

/// One grid-aligned record of world data, the unit of loading and eviction.
///
/// A chunk is created by reading a payload out of a region file and destroyed
/// on eviction; a dirty chunk is written back through the adapter before its
/// memory is released.
#[derive(Debug, Clone)]
pub struct Chunk {
    key: ChunkKey,
    file: FileRef,
    position: FilePosition,
    payload: Bytes,
    dirty: bool,
}

impl Chunk {
    pub fn new(key: ChunkKey, file: FileRef, position: FilePosition, payload: Bytes) -> Self {
        Self {
            key,
            file,
            position,
            payload,
            dirty: false,
        }
    }

    pub fn key(&self) -> ChunkKey {
        self.key
    }

    pub fn file(&self) -> &FileRef {
        &self.file
    }

    pub fn position(&self) -> FilePosition {
        self.position
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Replaces the payload and marks the chunk dirty.
    pub fn set_payload(&mut self, payload: Bytes) {
        self.payload = payload;
        self.dirty = true;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether the chunk has unsaved changes.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}
