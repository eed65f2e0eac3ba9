use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free cumulative hit/miss counters.
#[derive(Debug, Default)]
pub struct HitCounter {
  hits: AtomicU64,
  misses: AtomicU64,
}

impl HitCounter {
  pub fn record_hit(&self) {
    self.hits.fetch_add(1, Ordering::Relaxed);
  }

  pub fn record_miss(&self) {
    self.misses.fetch_add(1, Ordering::Relaxed);
  }

  pub fn hits(&self) -> u64 {
    self.hits.load(Ordering::Relaxed)
  }

  pub fn misses(&self) -> u64 {
    self.misses.load(Ordering::Relaxed)
  }

  pub fn reset(&self) {
    self.hits.store(0, Ordering::Relaxed);
    self.misses.store(0, Ordering::Relaxed);
  }
}
