use std::time::Duration;
use tokio::time::Instant;

/// A cached value with the instant it was stored and its time-to-live.
///
/// Entries are never mutated after insertion; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  pub data: T,
  pub timestamp: Instant,
  pub ttl: Duration,
}

impl<T> CacheEntry<T> {
  pub fn new(data: T, ttl: Duration) -> Self {
    Self {
      data,
      timestamp: Instant::now(),
      ttl,
    }
  }

  /// Valid while the entry is strictly younger than its ttl.
  pub fn is_valid(&self) -> bool {
    self.timestamp.elapsed() < self.ttl
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_valid_until_ttl_elapses() {
    let entry = CacheEntry::new("x", Duration::from_millis(100));
    assert!(entry.is_valid());

    tokio::time::advance(Duration::from_millis(99)).await;
    assert!(entry.is_valid());

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(!entry.is_valid());
  }

  #[tokio::test(start_paused = true)]
  async fn test_zero_ttl_is_never_valid() {
    let entry = CacheEntry::new(1u64, Duration::ZERO);
    assert!(!entry.is_valid());
  }
}
