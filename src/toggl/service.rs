//! Cached Toggl client that hydrates entries through the entity cache.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use std::sync::Arc;

use crate::config::{CacheConfig, Config};
use crate::timeline::{self, TimelineQuery, TimelineSummary};

use super::cache::{CacheStats, EntityCache};
use super::client::TogglClient;
use super::hydrate::Hydrator;
use super::source::TogglSource;
use super::types::{HydratedTimeEntry, TimeEntry};
use super::warm::{CacheWarmer, WarmTarget};

/// Toggl access with transparent entity caching.
///
/// Constructed once per process. Clones share the cache and the in-flight
/// warm slots.
#[derive(Clone)]
pub struct CachedToggl {
  source: Arc<dyn TogglSource>,
  cache: Arc<EntityCache>,
  hydrator: Hydrator,
  warmer: CacheWarmer,
}

impl CachedToggl {
  /// Create a cached client talking to the Toggl API.
  pub fn from_config(config: &Config) -> Result<Self> {
    let client = TogglClient::new(config)?;
    Ok(Self::new(Arc::new(client), &config.cache))
  }

  pub fn new(source: Arc<dyn TogglSource>, config: &CacheConfig) -> Self {
    let cache = Arc::new(EntityCache::new(config));
    Self {
      hydrator: Hydrator::new(Arc::clone(&source), Arc::clone(&cache)),
      warmer: CacheWarmer::new(Arc::clone(&source), Arc::clone(&cache)),
      source,
      cache,
    }
  }

  pub async fn hydrate_time_entries(&self, entries: &[TimeEntry]) -> Vec<HydratedTimeEntry> {
    self.hydrator.hydrate(entries).await
  }

  /// Warm one workspace, or the workspace list and the first few workspaces.
  pub async fn warm_cache(&self, workspace_id: Option<u64>) {
    self.warmer.warm(WarmTarget::from(workspace_id)).await
  }

  pub fn get_stats(&self) -> CacheStats {
    self.cache.stats()
  }

  pub fn clear_cache(&self) {
    self.cache.clear()
  }

  pub fn prune_expired(&self) -> usize {
    self.cache.prune_expired()
  }

  /// Fetch the entries that started in `[start, end)` and hydrate them.
  pub async fn time_entries(
    &self,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
  ) -> Result<Vec<HydratedTimeEntry>> {
    let entries = self.source.get_time_entries(start, end).await?;
    Ok(self.hydrate_time_entries(&entries).await)
  }

  /// Fetch timeline events and summarize them as of now (not cached).
  pub async fn timeline(&self, query: &TimelineQuery) -> Result<TimelineSummary> {
    let events = self.source.get_timeline().await?;
    Ok(timeline::summarize(&events, query, Utc::now().timestamp()))
  }
}
