//! Toggl Track domain: entity types, the upstream API, and the cached
//! hydration service built on `crate::cache`.

pub mod cache;
pub mod client;
pub mod hydrate;
pub mod service;
pub mod source;
pub mod types;
pub mod warm;

#[cfg(test)]
pub(crate) mod stub;

pub use cache::{CacheStats, EntityCache, PartitionSizes};
pub use client::TogglClient;
pub use hydrate::Hydrator;
pub use service::CachedToggl;
pub use source::TogglSource;
pub use warm::{CacheWarmer, WarmTarget};
