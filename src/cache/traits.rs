//! Core traits for the entity cache.

/// Trait for entities that can be cached by numeric id.
///
/// Implementors provide their id and an entity type name, which is used for
/// log lines and for placeholder names when an id cannot be resolved.
pub trait Cacheable: Clone + Send + Sync + 'static {
  /// Unique identifier for this entity within its kind
  fn cache_id(&self) -> u64;

  /// Entity type name (e.g., "Project", "Tag")
  fn entity_type() -> &'static str;

  /// Deterministic stand-in name used when `id` cannot be resolved.
  fn placeholder(id: u64) -> String {
    format!("{} {}", Self::entity_type(), id)
  }
}
