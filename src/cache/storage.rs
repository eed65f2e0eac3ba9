//! Bounded, TTL-aware in-memory storage for a single entity kind.

use indexmap::IndexMap;
use std::time::Duration;

use super::entry::CacheEntry;

/// Insertion-ordered map of id to cache entry.
///
/// Eviction is FIFO by insertion: when the store is full, the oldest inserted
/// id is dropped before a new id goes in. Reads never reorder entries, so this
/// approximates LRU rather than implementing it.
#[derive(Debug)]
pub struct EntityStore<T> {
  entries: IndexMap<u64, CacheEntry<T>>,
  capacity: usize,
  ttl: Duration,
}

impl<T> EntityStore<T> {
  pub fn new(capacity: usize, ttl: Duration) -> Self {
    Self {
      entries: IndexMap::new(),
      capacity,
      ttl,
    }
  }

  /// Get a valid entry. Expired entries are left in place and reported as absent.
  pub fn get(&self, id: u64) -> Option<&T> {
    self
      .entries
      .get(&id)
      .filter(|entry| entry.is_valid())
      .map(|entry| &entry.data)
  }

  /// Insert or overwrite `id` with a fresh timestamp.
  ///
  /// Returns the id evicted to make room, if any. A full store evicts its
  /// oldest entry even when `id` is already present; an overwrite that is not
  /// evicted keeps its insertion position. A store with zero capacity stores
  /// nothing.
  pub fn insert(&mut self, id: u64, data: T) -> Option<u64> {
    if self.capacity == 0 {
      return None;
    }

    let entry = CacheEntry::new(data, self.ttl);
    let evicted = if self.entries.len() >= self.capacity {
      self.entries.shift_remove_index(0).map(|(evicted, _)| evicted)
    } else {
      None
    };

    self.entries.insert(id, entry);
    evicted
  }

  /// Remove every entry whose age has reached the ttl. Returns how many were removed.
  pub fn prune_expired(&mut self) -> usize {
    let before = self.entries.len();
    self.entries.retain(|_, entry| entry.is_valid());
    before - self.entries.len()
  }

  pub fn clear(&mut self) {
    self.entries.clear();
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }
}
