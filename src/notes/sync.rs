//! Keeps cached project note collections in step with confirmed mutations.
//!
//! Each patch runs after the store has confirmed the write and touches only
//! the member it concerns. Members are located by note id through the
//! collection's token index; the partition is shared by every note of a
//! project and is only used to decide scope membership.

use color_eyre::Result;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheStorage, QueryKey};
#[cfg(test)]
use crate::cache::RefSet;

use super::cache::{note_ref, NoteQueryKey};
use super::types::{DeletedNote, Note, Project};

/// Applies create/update/delete results to the cached collection of a project
pub struct CacheSynchronizer<S: CacheStorage> {
  storage: Arc<S>,
}

impl<S: CacheStorage> CacheSynchronizer<S> {
  pub fn new(storage: Arc<S>) -> Self {
    Self { storage }
  }

  /// Current member tokens, unresolved. `None` until the first read completes.
  #[cfg(test)]
  pub fn collection(&self, project: &Project) -> Result<Option<RefSet>> {
    let key = NoteQueryKey::project_notes(project).cache_hash();
    Ok(self.storage.read_collection(&key)?.map(|c| c.refs))
  }

  /// Append a newly created note.
  ///
  /// The note is written first so its token exists before it is linked.
  /// An absent collection stays absent; its first read fetches everything.
  pub fn note_created(&self, project: &Project, note: &Note) -> Result<()> {
    let cache_ref = self.storage.write_entity(note)?;
    if note.partition != project.partition() {
      debug!(note = %note.id, "created note belongs to another partition, not linking");
      return Ok(());
    }

    let key = NoteQueryKey::project_notes(project);
    let applied = self.storage.modify_collection(&key.cache_hash(), |refs| {
      if !refs.push(cache_ref) {
        debug!(note = %note.id, "created note already cached");
      }
    })?;

    debug!(note = %note.id, query = %key.description(), applied, "applied create");
    Ok(())
  }

  /// Replace the entry of an updated note in place.
  ///
  /// Only the entry with the note's id is touched. If the note moved out of
  /// the project partition it is dropped from the collection instead.
  pub fn note_updated(&self, project: &Project, note: &Note) -> Result<()> {
    let old_ref = note_ref(&note.id);
    let new_ref = self.storage.write_entity(note)?;
    let in_scope = note.partition == project.partition();

    let key = NoteQueryKey::project_notes(project);
    let applied = self.storage.modify_collection(&key.cache_hash(), |refs| {
      if in_scope {
        refs.replace(&old_ref, new_ref);
      } else {
        refs.remove(&old_ref);
      }
    })?;

    debug!(note = %note.id, in_scope, applied, "applied update");
    Ok(())
  }

  /// Remove a deleted note. Removing an already missing note is a no-op.
  pub fn note_deleted(&self, project: &Project, deleted: &DeletedNote) -> Result<()> {
    let cache_ref = note_ref(&deleted.id);

    let key = NoteQueryKey::project_notes(project);
    let mut removed = false;
    self.storage.modify_collection(&key.cache_hash(), |refs| {
      removed = refs.remove(&cache_ref);
    })?;
    self.storage.evict_entity(&cache_ref)?;

    debug!(note = %deleted.id, removed, "applied delete");
    Ok(())
  }

  /// Drop the project collection so the next read refetches it
  pub fn invalidate(&self, project: &Project) -> Result<()> {
    let key = NoteQueryKey::project_notes(project).cache_hash();
    self.storage.invalidate_collection(&key)
  }

  /// Resolve a token set into notes, skipping dangling tokens
  #[cfg(test)]
  pub fn resolve(&self, refs: &RefSet) -> Result<Vec<Note>> {
    let mut notes = Vec::with_capacity(refs.len());
    for cache_ref in refs.iter() {
      if let Some(cached) = self.storage.read_entity::<Note>(cache_ref)? {
        notes.push(cached.entity);
      }
    }
    Ok(notes)
  }
}

impl<S: CacheStorage> Clone for CacheSynchronizer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
