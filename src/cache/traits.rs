//! Core traits and types for the caching system.

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

/// Trait for entities that can be cached.
///
/// Implementors provide a unique key; the cache addresses the entity through
/// the reference token derived from it.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Unique identifier for this entity (e.g., note id)
  fn cache_key(&self) -> String;

  /// Entity type name used as the token prefix (e.g., "Note")
  fn entity_type() -> &'static str;

  /// Reference token for this entity
  fn cache_ref(&self) -> CacheRef {
    CacheRef::new(Self::entity_type(), &self.cache_key())
  }
}

/// Trait for query keys that address a cached collection.
pub trait QueryKey {
  /// Stable hash used as the storage key
  fn cache_hash(&self) -> String;

  /// Human readable description (for logs)
  fn description(&self) -> String;
}

/// Token identifying a cached entity without resolving its fields.
///
/// Formatted as `<entity type>:<key>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheRef(String);

impl CacheRef {
  pub fn new(entity_type: &str, key: &str) -> Self {
    Self(format!("{}:{}", entity_type, key))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for CacheRef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
