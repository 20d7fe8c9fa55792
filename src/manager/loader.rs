//! Cancellable background population of the cache index.
//!
//! `set_folder` spawns one loader task per call; the newest call owns the
//! live generation and any older task detects supersession at its next
//! checkpoint and returns silently. The loader populates the reload ledger
//! only: chunks become resident on demand, never during the initial scan.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::facade::Inner;
use crate::cache::CacheError;
use crate::chunk::Chunk;

pub(super) async fn run(inner: Arc<Inner>, folder: &Path, generation: u64) -> Result<(), CacheError> {
    {
        let _guard = inner.loader_lock.lock();
        if !inner.is_current(generation) {
            return Ok(());
        }
        inner.table.clear();
        inner.evictable.clear();
        inner.edits.clear();
        inner.queue.clear();
        inner.adapter.clear_cache();
    }
    tracing::debug!("indexing region files in {}", folder.display());

    let files = region_files(&inner, folder).await?;
    let mut indexed = 0usize;
    for path in files {
        if !inner.is_current(generation) {
            return Ok(());
        }
        let file = inner.adapter.for_file(&path);
        let positions = inner.adapter.list_positions(&file).await?;
        for (key, position) in positions {
            if !inner.is_current(generation) {
                return Ok(());
            }
            // Read once to validate the record; the fresh chunk is clean so
            // ledgering it writes nothing back.
            let payload = inner.adapter.read(&file, position).await?;
            let chunk = Chunk::new(key, file.clone(), position, payload);

            let _guard = inner.loader_lock.lock();
            if !inner.is_current(generation) {
                return Ok(());
            }
            inner
                .table
                .insert_ledger(chunk.key(), chunk.file().clone(), chunk.position());
            indexed += 1;
        }
        inner.listener.something_changed();
    }

    tracing::debug!("indexed {} chunks from {}", indexed, folder.display());
    Ok(())
}

/// Lists the container files in `folder`, sorted by filename with the `-`
/// separator stripped, ascending.
async fn region_files(inner: &Inner, folder: &Path) -> Result<Vec<PathBuf>, CacheError> {
    let mut files = Vec::new();
    let mut dir = tokio::fs::read_dir(folder).await?;
    while let Some(entry) = dir.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file() && inner.adapter.is_region_file(&path) {
            files.push(path);
        }
    }
    files.sort_by_key(|path| file_sort_key(path));
    Ok(files)
}

fn file_sort_key(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().replace('-', ""))
        .unwrap_or_default()
}
