use thiserror::Error;

use crate::pos::ChunkKey;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Early warning raised by the heap guard before a real allocation
    /// failure can happen. Always resolved inside the reload loop; never
    /// surfaced to callers.
    #[error("free memory below pressure threshold")]
    SoftLimit,

    /// A genuine allocation failure reported by the adapter. Retryable only
    /// while evictable chunks remain.
    #[error("payload allocation failed")]
    AllocationFailed,

    /// An allocation failure with nothing left to evict and the guard
    /// already relaxed. Unrecoverable for the current operation.
    #[error("allocation failed with no evictable chunks")]
    FatalAllocation,

    #[error("chunk {0} is not resident")]
    NotResident(ChunkKey),
}
