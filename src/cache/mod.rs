//! Generic in-memory caching primitives.
//!
//! This module knows nothing about Toggl. It provides:
//! - `Cacheable` for entities addressed by numeric id
//! - `CacheEntry` with a creation instant and ttl
//! - `EntityStore`, a bounded FIFO-evicting store for one entity kind
//! - `HitCounter`, lock-free hit/miss accounting

mod entry;
mod stats;
mod storage;
mod traits;

pub use entry::CacheEntry;
pub use stats::HitCounter;
pub use storage::EntityStore;
pub use traits::Cacheable;
