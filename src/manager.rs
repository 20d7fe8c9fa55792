//! The region cache manager.
//!
//! # Overview
//!
//! [`RegionManager`] lets a caller treat a world-sized set of chunks as if
//! fully resident: chunks are loaded on request by a pool of background
//! workers and written back and released again under caller-driven eviction
//! or memory pressure.
//!
//! The lifecycle of a key is: discovered by the initial scan (ledgered,
//! index-only), promoted to resident by a reload worker, edited and marked
//! dirty through the batch edit path, then demoted back to the ledger with
//! its payload flushed. The cycle repeats indefinitely.
//!
//! # Concurrency
//!
//! Worker tasks, the initial loader and the calling thread all touch the
//! shared state, but each structure is independently synchronized and no
//! operation holds more than one lock at a time. Only the initial loader is
//! cancellable, by superseding its generation; the worker pool runs for the
//! life of the manager.
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use regioncache::{ChunkKey, RegionManager, UpdateListener};
//! # use regioncache::RegionAdapter;
//!
//! struct Redraw;
//!
//! impl UpdateListener for Redraw {
//!     fn something_changed(&self) { /* repaint */ }
//!     fn memory_panic(&self) { /* widen the evictable set */ }
//! }
//!
//! # async fn example(adapter: Arc<dyn RegionAdapter>) {
//! let manager = RegionManager::new(adapter, Arc::new(Redraw));
//! manager.set_folder("/world/region");
//!
//! // Later, when a chunk becomes visible:
//! let key = ChunkKey::of(120, -35);
//! if manager.get_chunk(key).is_none() {
//!     manager.request_reload(key);
//! }
//! # }
//! ```

mod edit;
mod facade;
mod loader;
mod reload;

pub use facade::{RegionManager, UpdateListener};
