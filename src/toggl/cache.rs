//! Entity cache for Toggl types.
//!
//! One bounded store per entity kind. The configured `max_size` is a global
//! budget split evenly across the six kinds.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::Serialize;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::cache::{Cacheable, EntityStore, HitCounter};
use crate::config::CacheConfig;

use super::types::{Client, Project, Tag, Task, User, Workspace};

const KIND_COUNT: usize = 6;

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for Workspace {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "Workspace"
  }
}

impl Cacheable for Project {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "Project"
  }
}

impl Cacheable for Client {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "Client"
  }
}

impl Cacheable for Task {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "Task"
  }
}

impl Cacheable for User {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "User"
  }
}

impl Cacheable for Tag {
  fn cache_id(&self) -> u64 {
    self.id
  }

  fn entity_type() -> &'static str {
    "Tag"
  }
}

// ============================================================================
// Partitions
// ============================================================================

/// Entity types that own a partition of the `EntityCache`.
pub trait Partitioned: Cacheable {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>>;
}

impl Partitioned for Workspace {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.workspaces
  }
}

impl Partitioned for Project {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.projects
  }
}

impl Partitioned for Client {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.clients
  }
}

impl Partitioned for Task {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.tasks
  }
}

impl Partitioned for User {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.users
  }
}

impl Partitioned for Tag {
  fn partition(cache: &EntityCache) -> &Mutex<EntityStore<Self>> {
    &cache.tags
  }
}

/// Store contents are consistent between calls, so a poisoned lock is safe to reuse.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Stats
// ============================================================================

/// Current entry count per entity kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PartitionSizes {
  pub workspaces: usize,
  pub projects: usize,
  pub clients: usize,
  pub tasks: usize,
  pub users: usize,
  pub tags: usize,
}

impl PartitionSizes {
  pub fn total(&self) -> usize {
    self.workspaces + self.projects + self.clients + self.tasks + self.users + self.tags
  }
}

/// Snapshot of cache sizes and cumulative hit/miss counts since the last clear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
  pub sizes: PartitionSizes,
  pub hits: u64,
  pub misses: u64,
  pub last_reset: DateTime<Utc>,
}

impl CacheStats {
  /// Hit rate in 0.0..=1.0, or 0.0 before any lookup.
  pub fn hit_rate(&self) -> f64 {
    let total = self.hits + self.misses;
    if total == 0 {
      0.0
    } else {
      self.hits as f64 / total as f64
    }
  }
}

// ============================================================================
// Cache
// ============================================================================

/// In-memory cache of workspaces, projects, clients, tasks, users and tags.
pub struct EntityCache {
  workspaces: Mutex<EntityStore<Workspace>>,
  projects: Mutex<EntityStore<Project>>,
  clients: Mutex<EntityStore<Client>>,
  tasks: Mutex<EntityStore<Task>>,
  users: Mutex<EntityStore<User>>,
  tags: Mutex<EntityStore<Tag>>,
  counter: HitCounter,
  last_reset: Mutex<DateTime<Utc>>,
}

impl EntityCache {
  pub fn new(config: &CacheConfig) -> Self {
    Self::with_limits(config.max_size, config.ttl())
  }

  /// Create a cache whose `max_size` budget is split evenly over the six kinds.
  pub fn with_limits(max_size: usize, ttl: Duration) -> Self {
    let capacity = max_size / KIND_COUNT;
    Self {
      workspaces: Mutex::new(EntityStore::new(capacity, ttl)),
      projects: Mutex::new(EntityStore::new(capacity, ttl)),
      clients: Mutex::new(EntityStore::new(capacity, ttl)),
      tasks: Mutex::new(EntityStore::new(capacity, ttl)),
      users: Mutex::new(EntityStore::new(capacity, ttl)),
      tags: Mutex::new(EntityStore::new(capacity, ttl)),
      counter: HitCounter::default(),
      last_reset: Mutex::new(Utc::now()),
    }
  }

  /// Per-kind capacity.
  pub fn capacity(&self) -> usize {
    lock(&self.workspaces).capacity()
  }

  /// Look up a valid entry, recording a hit or a miss.
  pub fn get<T: Partitioned>(&self, id: u64) -> Option<T> {
    let found = lock(T::partition(self)).get(id).cloned();
    if found.is_some() {
      self.counter.record_hit();
      debug!(kind = T::entity_type(), id, "cache hit");
    } else {
      self.counter.record_miss();
      debug!(kind = T::entity_type(), id, "cache miss");
    }
    found
  }

  /// Whether a valid entry exists, without touching the hit/miss counters.
  pub fn contains<T: Partitioned>(&self, id: u64) -> bool {
    lock(T::partition(self)).get(id).is_some()
  }

  /// Insert or overwrite an entity, evicting the oldest entry of its kind when full.
  pub fn put<T: Partitioned>(&self, entity: T) {
    let id = entity.cache_id();
    if let Some(evicted) = lock(T::partition(self)).insert(id, entity) {
      debug!(kind = T::entity_type(), evicted, inserted = id, "cache eviction");
    }
  }

  /// Empty every partition and reset the hit/miss counters.
  pub fn clear(&self) {
    lock(&self.workspaces).clear();
    lock(&self.projects).clear();
    lock(&self.clients).clear();
    lock(&self.tasks).clear();
    lock(&self.users).clear();
    lock(&self.tags).clear();
    self.counter.reset();
    *lock(&self.last_reset) = Utc::now();
  }

  /// Drop expired entries from every partition. Counters are left alone.
  pub fn prune_expired(&self) -> usize {
    lock(&self.workspaces).prune_expired()
      + lock(&self.projects).prune_expired()
      + lock(&self.clients).prune_expired()
      + lock(&self.tasks).prune_expired()
      + lock(&self.users).prune_expired()
      + lock(&self.tags).prune_expired()
  }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      sizes: PartitionSizes {
        workspaces: lock(&self.workspaces).len(),
        projects: lock(&self.projects).len(),
        clients: lock(&self.clients).len(),
        tasks: lock(&self.tasks).len(),
        users: lock(&self.users).len(),
        tags: lock(&self.tags).len(),
      },
      hits: self.counter.hits(),
      misses: self.counter.misses(),
      last_reset: *lock(&self.last_reset),
    }
  }

  /// Fetch a single entity with caching.
  ///
  /// A valid cached entry is returned without calling `fetcher`. Otherwise the
  /// fetched value is cached before being returned. Fetch errors are passed
  /// through and nothing is cached.
  pub async fn fetch_one<T, F, Fut>(&self, id: u64, fetcher: F) -> Result<T>
  where
    T: Partitioned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    if let Some(cached) = self.get::<T>(id) {
      return Ok(cached);
    }

    let data = fetcher().await?;
    self.put(data.clone());
    Ok(data)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use color_eyre::eyre::eyre;

  fn tag(id: u64) -> Tag {
    Tag {
      id,
      workspace_id: 1,
      name: format!("tag-{id}"),
    }
  }

  fn project(id: u64) -> Project {
    Project {
      id,
      workspace_id: 1,
      name: format!("project-{id}"),
      client_id: None,
      active: true,
      color: None,
    }
  }

  #[tokio::test]
  async fn test_budget_split_across_kinds() {
    let cache = EntityCache::with_limits(20, Duration::from_secs(60));
    assert_eq!(cache.capacity(), 3);

    for id in 1..=5 {
      cache.put(tag(id));
    }
    cache.put(project(1));

    let stats = cache.stats();
    assert_eq!(stats.sizes.tags, 3);
    assert_eq!(stats.sizes.projects, 1);
    assert_eq!(stats.sizes.total(), 4);

    // The two earliest tags were evicted.
    assert!(!cache.contains::<Tag>(1));
    assert!(!cache.contains::<Tag>(2));
    assert!(cache.contains::<Tag>(5));
  }

  #[tokio::test]
  async fn test_refresh_at_capacity_evicts_oldest() {
    let cache = EntityCache::with_limits(12, Duration::from_secs(60));
    cache.put(tag(1));
    cache.put(tag(2));

    cache.put(tag(2));
    assert!(!cache.contains::<Tag>(1));
    assert!(cache.contains::<Tag>(2));
    assert_eq!(cache.stats().sizes.tags, 1);
  }

  #[tokio::test]
  async fn test_misses_then_hit() {
    let cache = EntityCache::with_limits(60, Duration::from_secs(60));
    for id in 1..=4 {
      assert!(cache.get::<Project>(id).is_none());
    }
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (0, 4));

    let fetched = cache
      .fetch_one(9, || async { Ok(project(9)) })
      .await
      .unwrap();
    assert_eq!(fetched.name, "project-9");
    assert_eq!(cache.get::<Project>(9), Some(project(9)));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 5));
    assert!((stats.hit_rate() - 1.0 / 6.0).abs() < f64::EPSILON);
  }

  #[tokio::test]
  async fn test_contains_does_not_count() {
    let cache = EntityCache::with_limits(60, Duration::from_secs(60));
    cache.put(tag(1));
    assert!(cache.contains::<Tag>(1));
    assert!(!cache.contains::<Tag>(2));

    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (0, 0));
  }

  #[tokio::test]
  async fn test_fetch_one_uses_cache() {
    let cache = EntityCache::with_limits(60, Duration::from_secs(60));
    cache.put(tag(3));

    let result = cache
      .fetch_one::<Tag, _, _>(3, || async { Err(eyre!("should not be called")) })
      .await
      .unwrap();
    assert_eq!(result, tag(3));
  }

  #[tokio::test]
  async fn test_fetch_one_error_caches_nothing() {
    let cache = EntityCache::with_limits(60, Duration::from_secs(60));
    let result = cache
      .fetch_one::<Tag, _, _>(3, || async { Err(eyre!("not found")) })
      .await;

    assert!(result.is_err());
    assert_eq!(cache.stats().sizes.tags, 0);
  }

  #[tokio::test(start_paused = true)]
  async fn test_ttl_boundary() {
    let cache = EntityCache::with_limits(60, Duration::from_millis(500));
    cache.put(tag(1));

    tokio::time::advance(Duration::from_millis(499)).await;
    assert!(cache.get::<Tag>(1).is_some());

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(cache.get::<Tag>(1).is_none());

    // Expired but still stored until pruned.
    assert_eq!(cache.stats().sizes.tags, 1);
    assert_eq!(cache.prune_expired(), 1);
    assert_eq!(cache.stats().sizes.tags, 0);
    assert_eq!(cache.stats().misses, 1);
  }

  #[tokio::test]
  async fn test_clear_resets_counters_and_contents() {
    let cache = EntityCache::with_limits(60, Duration::from_secs(60));
    cache.put(tag(1));
    cache.put(project(1));
    cache.get::<Tag>(1);
    cache.get::<Tag>(2);
    let before = cache.stats().last_reset;

    cache.clear();
    let stats = cache.stats();
    assert_eq!(stats.sizes, PartitionSizes::default());
    assert_eq!((stats.hits, stats.misses), (0, 0));
    assert!(stats.last_reset >= before);

    assert!(cache.get::<Tag>(1).is_none());
    assert_eq!(cache.stats().misses, 1);
  }

  #[test]
  fn test_placeholder_names() {
    assert_eq!(Workspace::placeholder(7), "Workspace 7");
    assert_eq!(Client::placeholder(12), "Client 12");
  }
}
