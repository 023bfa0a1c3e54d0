//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::refs::RefSet;
use super::traits::{CacheRef, Cacheable};

/// Result of a cached collection lookup.
#[derive(Debug, Clone)]
pub struct CachedCollection {
  /// Member tokens in order
  pub refs: RefSet,
  /// When the collection was last read from the network
  pub cached_at: DateTime<Utc>,
}

/// A single cached entity.
#[derive(Debug, Clone)]
pub struct CachedEntity<T> {
  /// The cached entity
  pub entity: T,
  /// When the entity was cached
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Entities are stored once, addressed by their reference token. Collections
/// hold tokens only.
pub trait CacheStorage: Send + Sync {
  /// Store (or overwrite) an entity and return its token.
  fn write_entity<T: Cacheable>(&self, entity: &T) -> Result<CacheRef>;

  /// Resolve a token into its entity.
  fn read_entity<T: Cacheable>(&self, cache_ref: &CacheRef) -> Result<Option<CachedEntity<T>>>;

  /// Drop an entity. Returns whether it was present.
  fn evict_entity(&self, cache_ref: &CacheRef) -> Result<bool>;

  /// Get a cached collection, `None` if it was never populated.
  fn read_collection(&self, key: &str) -> Result<Option<CachedCollection>>;

  /// Replace a collection with a freshly fetched member list.
  fn write_collection(&self, key: &str, refs: RefSet) -> Result<()>;

  /// Patch a populated collection in one critical section.
  ///
  /// Returns false without calling `patch` when the collection is absent.
  fn modify_collection<F>(&self, key: &str, patch: F) -> Result<bool>
  where
    F: FnOnce(&mut RefSet);

  /// Forget a collection so the next read goes to the network.
  fn invalidate_collection(&self, key: &str) -> Result<()>;
}

#[derive(Default)]
struct MemoryState {
  entities: HashMap<CacheRef, CachedEntity<serde_json::Value>>,
  collections: HashMap<String, CachedCollection>,
}

/// Process-local cache storage. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
  state: Mutex<MemoryState>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
    self.state.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }

  /// Poison the state lock so every later call fails
  #[cfg(test)]
  pub fn poison(&self) {
    let _ = std::thread::scope(|s| {
      s.spawn(|| {
        let _guard = self.state.lock();
        panic!("poisoning cache lock");
      })
      .join()
    });
  }
}

impl CacheStorage for MemoryStorage {
  fn write_entity<T: Cacheable>(&self, entity: &T) -> Result<CacheRef> {
    let cache_ref = entity.cache_ref();
    let data =
      serde_json::to_value(entity).map_err(|e| eyre!("Failed to serialize entity: {}", e))?;

    self.lock()?.entities.insert(
      cache_ref.clone(),
      CachedEntity {
        entity: data,
        cached_at: Utc::now(),
      },
    );

    Ok(cache_ref)
  }

  fn read_entity<T: Cacheable>(&self, cache_ref: &CacheRef) -> Result<Option<CachedEntity<T>>> {
    let cached = match self.lock()?.entities.get(cache_ref) {
      Some(cached) => cached.clone(),
      None => return Ok(None),
    };

    let entity: T = serde_json::from_value(cached.entity)
      .map_err(|e| eyre!("Failed to deserialize entity {}: {}", cache_ref, e))?;

    Ok(Some(CachedEntity {
      entity,
      cached_at: cached.cached_at,
    }))
  }

  fn evict_entity(&self, cache_ref: &CacheRef) -> Result<bool> {
    Ok(self.lock()?.entities.remove(cache_ref).is_some())
  }

  fn read_collection(&self, key: &str) -> Result<Option<CachedCollection>> {
    Ok(self.lock()?.collections.get(key).cloned())
  }

  fn write_collection(&self, key: &str, refs: RefSet) -> Result<()> {
    self.lock()?.collections.insert(
      key.to_string(),
      CachedCollection {
        refs,
        cached_at: Utc::now(),
      },
    );
    Ok(())
  }

  fn modify_collection<F>(&self, key: &str, patch: F) -> Result<bool>
  where
    F: FnOnce(&mut RefSet),
  {
    let mut state = self.lock()?;
    match state.collections.get_mut(key) {
      Some(collection) => {
        patch(&mut collection.refs);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  fn invalidate_collection(&self, key: &str) -> Result<()> {
    self.lock()?.collections.remove(key);
    Ok(())
  }
}
