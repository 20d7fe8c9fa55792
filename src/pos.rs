//! World-space coordinate transforms.
//!
//! Chunks are aligned to a fixed grid of [`CHUNK_SIZE`] world units. A
//! [`ChunkKey`] is the world-space origin of a chunk and an
//! [`InChunkOffset`] is a position relative to that origin.
//!
//! Both conversions use floor semantics, not truncation: `-1 / 16` truncates
//! to `0` but the chunk containing world x `-1` starts at `-16`, so the
//! implementation goes through `div_euclid` / `rem_euclid`.

/// Side length of a chunk in world units.
pub const CHUNK_SIZE: i32 = 16;

/// The world-space origin of a chunk, always a multiple of [`CHUNK_SIZE`]
/// in both components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub x: i32,
    pub z: i32,
}

impl ChunkKey {
    /// Returns the key of the chunk containing the world position `(x, z)`.
    pub fn of(x: i32, z: i32) -> Self {
        Self {
            x: x.div_euclid(CHUNK_SIZE) * CHUNK_SIZE,
            z: z.div_euclid(CHUNK_SIZE) * CHUNK_SIZE,
        }
    }
}

impl std::fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A position relative to its chunk's origin, both components in
/// `[0, CHUNK_SIZE)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InChunkOffset {
    pub x: i32,
    pub z: i32,
}

impl InChunkOffset {
    /// Returns the in-chunk offset of the world position `(x, z)`.
    ///
    /// The result is non-negative even for negative world coordinates.
    pub fn of(x: i32, z: i32) -> Self {
        Self {
            x: x.rem_euclid(CHUNK_SIZE),
            z: z.rem_euclid(CHUNK_SIZE),
        }
    }
}
