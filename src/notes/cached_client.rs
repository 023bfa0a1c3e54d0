//! Note client that wraps the gateway with a read-through cache.

use chrono::Duration;
use color_eyre::Result;
use std::sync::Arc;
use tracing::warn;

use crate::cache::{CacheLayer, MemoryStorage};
use crate::config::Config;

use super::cache::NoteQueryKey;
use super::error::NoteError;
use super::gateway::RemoteNoteGateway;
use super::sync::CacheSynchronizer;
use super::transport::{GraphqlClient, NoteStore};
use super::types::{DeletedNote, Note, NoteContent, NoteId, NoteUpdates, Project};

/// Note client with transparent caching.
///
/// Reads go through the cache layer. Mutations go to the gateway first and
/// are applied to the cache only once the store has confirmed them.
#[derive(Clone)]
pub struct CachedNoteClient {
  gateway: RemoteNoteGateway,
  cache: CacheLayer<MemoryStorage>,
  sync: CacheSynchronizer<MemoryStorage>,
  host: String,
}

impl CachedNoteClient {
  /// Create a client talking to the configured GraphQL endpoint.
  pub fn new(config: &Config) -> Result<Self> {
    let transport = GraphqlClient::new(config)?;
    let host = transport.host().to_string();
    let gateway = RemoteNoteGateway::new(Arc::new(transport)).with_timeout(config.request_timeout());

    Ok(Self::with_gateway(gateway, config.cache.stale_time()).with_host(host))
  }

  /// Create a client over an arbitrary store
  pub fn with_store(store: Arc<dyn NoteStore>) -> Self {
    Self::with_gateway(RemoteNoteGateway::new(store), Duration::minutes(5))
  }

  fn with_gateway(gateway: RemoteNoteGateway, stale_time: Duration) -> Self {
    let cache = CacheLayer::new(MemoryStorage::new()).with_stale_time(stale_time);
    let sync = CacheSynchronizer::new(Arc::clone(cache.storage()));
    Self {
      gateway,
      cache,
      sync,
      host: String::new(),
    }
  }

  fn with_host(mut self, host: String) -> Self {
    self.host = host;
    self
  }

  /// Host of the note store
  pub fn host(&self) -> &str {
    &self.host
  }

  /// Synchronizer over this client's cache
  #[cfg(test)]
  pub fn synchronizer(&self) -> &CacheSynchronizer<MemoryStorage> {
    &self.sync
  }

  /// All notes of a project, from cache while fresh.
  pub async fn notes(&self, project: &Project) -> Result<Vec<Note>, NoteError> {
    let key = NoteQueryKey::project_notes(project);
    self
      .cache
      .fetch_list(&key, || {
        let gateway = self.gateway.clone();
        let project = project.clone();
        async move { gateway.fetch_notes(&project).await }
      })
      .await
  }

  /// A single note of a project. `None` if the store has no such note.
  pub async fn note(&self, project: &Project, id: &NoteId) -> Result<Option<Note>, NoteError> {
    let partition = project.partition();
    self
      .cache
      .fetch_one(
        id.as_str(),
        |cached: &Note| cached.partition == partition,
        || {
          let gateway = self.gateway.clone();
          let project = project.clone();
          let id = id.clone();
          async move { gateway.fetch_note(&project, &id).await }
        },
      )
      .await
  }

  /// Create a note and append it to the cached project collection.
  pub async fn create_note(
    &self,
    project: &Project,
    id: NoteId,
    content: NoteContent,
  ) -> Result<Note, NoteError> {
    let note = self.gateway.create_note(project, id, content).await?;
    self.after_mutation(project, self.sync.note_created(project, &note));
    Ok(note)
  }

  /// Patch a note and replace its cached entry.
  pub async fn update_note(
    &self,
    project: &Project,
    id: &NoteId,
    updates: &NoteUpdates,
  ) -> Result<Note, NoteError> {
    let note = self.gateway.update_note(id, updates).await?;
    self.after_mutation(project, self.sync.note_updated(project, &note));
    Ok(note)
  }

  /// Delete a note and drop it from the cached project collection.
  pub async fn delete_note(&self, project: &Project, id: &NoteId) -> Result<DeletedNote, NoteError> {
    let deleted = self.gateway.delete_note(id).await?;
    self.after_mutation(project, self.sync.note_deleted(project, &deleted));
    Ok(deleted)
  }

  /// The write is already confirmed, so a failed patch must not fail the
  /// call. Drop the collection instead so the next read refetches it.
  fn after_mutation(&self, project: &Project, patched: Result<()>) {
    if let Err(e) = patched {
      warn!(project = %project.id, error = %e, "cache patch failed, invalidating");
      if let Err(e) = self.sync.invalidate(project) {
        warn!(project = %project.id, error = %e, "cache invalidation failed");
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::mock::{note, MockNoteStore};
  use crate::notes::types::Block;

  fn client(notes: Vec<Note>) -> (CachedNoteClient, Arc<MockNoteStore>) {
    let store = Arc::new(MockNoteStore::with_notes(notes));
    (CachedNoteClient::with_store(store.clone()), store)
  }

  fn ids(notes: &[Note]) -> Vec<&str> {
    notes.iter().map(|n| n.id.as_str()).collect()
  }

  fn content(text: &str) -> NoteContent {
    NoteContent {
      blocks: vec![Block::paragraph(text)],
    }
  }

  #[tokio::test]
  async fn test_read_after_create_needs_no_fetch() {
    let (client, store) = client(vec![note("A", "note=P1", "a"), note("B", "note=P1", "b")]);
    let project = Project::new("P1");

    assert_eq!(ids(&client.notes(&project).await.unwrap()), vec!["A", "B"]);
    let reads = store.read_count();

    let created = client
      .create_note(&project, NoteId::new("C"), content("c"))
      .await
      .unwrap();
    assert_eq!(created.partition, project.partition());

    let notes = client.notes(&project).await.unwrap();
    assert_eq!(ids(&notes), vec!["A", "B", "C"]);
    assert_eq!(store.read_count(), reads);
  }

  #[tokio::test]
  async fn test_failed_mutations_leave_cache_untouched() {
    let (client, store) = client(vec![note("A", "note=P1", "a"), note("B", "note=P1", "b")]);
    let project = Project::new("P1");
    client.notes(&project).await.unwrap();
    let before = client.synchronizer().collection(&project).unwrap();

    store.set_failing(true);
    let created = client
      .create_note(&project, NoteId::new("C"), content("c"))
      .await;
    let updated = client
      .update_note(&project, &NoteId::new("A"), &NoteUpdates::default())
      .await;
    let deleted = client.delete_note(&project, &NoteId::new("B")).await;

    assert!(matches!(created, Err(NoteError::Mutation(_))));
    assert!(matches!(updated, Err(NoteError::Mutation(_))));
    assert!(matches!(deleted, Err(NoteError::Mutation(_))));
    assert_eq!(client.synchronizer().collection(&project).unwrap(), before);
  }

  #[tokio::test]
  async fn test_update_replaces_only_that_note() {
    let (client, store) = client(vec![note("X", "note=P1", "x"), note("Y", "note=P1", "y")]);
    let project = Project::new("P1");
    client.notes(&project).await.unwrap();
    let reads = store.read_count();

    let updates = NoteUpdates {
      blocks: Some(vec![Block::paragraph("edited")]),
    };
    client
      .update_note(&project, &NoteId::new("X"), &updates)
      .await
      .unwrap();

    let notes = client.notes(&project).await.unwrap();
    assert_eq!(ids(&notes), vec!["X", "Y"]);
    assert_eq!(notes[0].blocks[0].plain_text(), "edited");
    assert_eq!(notes[1], note("Y", "note=P1", "y"));
    assert_eq!(store.read_count(), reads);
  }

  #[tokio::test]
  async fn test_confirmed_write_survives_broken_cache() {
    let (client, store) = client(vec![note("A", "note=P1", "a")]);
    let project = Project::new("P1");
    client.notes(&project).await.unwrap();

    // Both the patch and the fallback invalidation fail
    client.cache.storage().poison();
    let created = client
      .create_note(&project, NoteId::new("B"), content("b"))
      .await
      .unwrap();

    assert_eq!(created.id, NoteId::new("B"));
    assert_eq!(store.notes(&project.partition()).await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn test_delete_twice_is_idempotent() {
    let (client, _) = client(vec![note("A", "note=P1", "a"), note("B", "note=P1", "b")]);
    let project = Project::new("P1");
    client.notes(&project).await.unwrap();

    client
      .delete_note(&project, &NoteId::new("B"))
      .await
      .unwrap();
    let after_first = client.synchronizer().collection(&project).unwrap();

    client
      .delete_note(&project, &NoteId::new("B"))
      .await
      .unwrap();
    assert_eq!(client.synchronizer().collection(&project).unwrap(), after_first);
    assert_eq!(ids(&client.notes(&project).await.unwrap()), vec!["A"]);
  }

  #[tokio::test]
  async fn test_single_note_read_uses_cached_entity() {
    let (client, store) = client(vec![note("A", "note=P1", "a")]);
    let project = Project::new("P1");

    let first = client.note(&project, &NoteId::new("A")).await.unwrap();
    let reads = store.read_count();
    let second = client.note(&project, &NoteId::new("A")).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(store.read_count(), reads);
  }

  #[tokio::test]
  async fn test_missing_note_is_absent_not_error() {
    let (client, _) = client(vec![]);
    let result = client
      .note(&Project::new("P1"), &NoteId::new("nope"))
      .await;
    assert_eq!(result, Ok(None));
  }

  #[tokio::test]
  async fn test_fetch_error_is_propagated() {
    let (client, store) = client(vec![]);
    store.set_failing(true);
    let err = client.notes(&Project::new("P1")).await.unwrap_err();
    assert_eq!(err, NoteError::Fetch("store unavailable".to_string()));
  }

  #[tokio::test]
  async fn test_note_from_other_project_is_not_served_from_cache() {
    let (client, _) = client(vec![note("A", "note=P1", "a")]);
    client
      .note(&Project::new("P1"), &NoteId::new("A"))
      .await
      .unwrap();

    let other = client
      .note(&Project::new("P2"), &NoteId::new("A"))
      .await
      .unwrap();
    assert!(other.is_none());
  }
}
