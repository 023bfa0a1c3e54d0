//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{DateTime, Duration, Utc};
use color_eyre::Report;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

use super::refs::RefSet;
use super::storage::CacheStorage;
use super::traits::{CacheRef, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the application and the network client. Fresh cached data
/// is served without a round-trip; stale or missing data is fetched and
/// stored. Network errors are returned to the caller, never masked by stale
/// data.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: Duration::minutes(5),
    }
  }

  /// Set the stale time for cached data.
  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  /// Shared handle to the storage backend
  pub fn storage(&self) -> &Arc<S> {
    &self.storage
  }

  /// Check if cached data is stale based on cached_at timestamp.
  fn is_stale(&self, cached_at: DateTime<Utc>) -> bool {
    Utc::now() - cached_at > self.stale_time
  }

  /// Fetch a collection with cache-first strategy.
  ///
  /// 1. Check cache - if fresh, resolve its tokens and return
  /// 2. If stale/missing, fetch from network
  /// 3. Store every entity and replace the collection's member list
  ///
  /// Tokens that no longer resolve to an entity are skipped.
  pub async fn fetch_list<K, T, E, F, Fut>(
    &self,
    key: &K,
    fetcher: F,
  ) -> Result<Vec<T>, E>
  where
    K: QueryKey,
    T: Cacheable,
    E: From<Report>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
  {
    let hash = key.cache_hash();

    if let Some(cached) = self.storage.read_collection(&hash)? {
      if !self.is_stale(cached.cached_at) {
        let mut entities = Vec::with_capacity(cached.refs.len());
        for cache_ref in cached.refs.iter() {
          if let Some(entry) = self.storage.read_entity::<T>(cache_ref)? {
            entities.push(entry.entity);
          }
        }
        return Ok(entities);
      }
      debug!(query = %key.description(), "cached collection is stale");
    }

    let data = fetcher().await?;
    let mut refs = RefSet::new();
    for entity in &data {
      refs.push(self.storage.write_entity(entity)?);
    }
    self.storage.write_collection(&hash, refs)?;
    debug!(query = %key.description(), count = data.len(), "stored collection");

    Ok(data)
  }

  /// Fetch a single optional entity with caching.
  ///
  /// A cached entity accepted by `matches` is served while fresh. A missing
  /// entity is not cached, so the next read asks the network again.
  pub async fn fetch_one<T, E, P, F, Fut>(
    &self,
    entity_key: &str,
    matches: P,
    fetcher: F,
  ) -> Result<Option<T>, E>
  where
    T: Cacheable,
    E: From<Report>,
    P: FnOnce(&T) -> bool,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
  {
    let cache_ref = CacheRef::new(T::entity_type(), entity_key);

    if let Some(cached) = self.storage.read_entity::<T>(&cache_ref)? {
      if !self.is_stale(cached.cached_at) && matches(&cached.entity) {
        return Ok(Some(cached.entity));
      }
    }

    let data = fetcher().await?;
    if let Some(entity) = &data {
      self.storage.write_entity(entity)?;
    }
    Ok(data)
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
    }
  }
}
