//! Remote note operations with error classification and a call timeout.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::api_types::NoteInsertInput;
use super::error::{NoteError, TransportError};
use super::transport::NoteStore;
use super::types::{DeletedNote, Note, NoteContent, NoteId, NoteUpdates, Project};

/// Issues reads and mutations against the note store.
///
/// Holds no cached state. Every call is bounded by `timeout`; an expired
/// call fails with the operation's error kind.
#[derive(Clone)]
pub struct RemoteNoteGateway {
  store: Arc<dyn NoteStore>,
  timeout: Duration,
}

impl RemoteNoteGateway {
  pub fn new(store: Arc<dyn NoteStore>) -> Self {
    Self {
      store,
      timeout: Duration::from_secs(30),
    }
  }

  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Fetch one note of the project. `None` when it doesn't exist.
  pub async fn fetch_note(&self, project: &Project, id: &NoteId) -> Result<Option<Note>, NoteError> {
    let partition = project.partition();
    debug!(note = %id, %partition, "fetching note");
    self
      .bounded(self.store.note(id, &partition))
      .await
      .map_err(|e| fetch_error("note", e))
  }

  /// Fetch every note in the project partition
  pub async fn fetch_notes(&self, project: &Project) -> Result<Vec<Note>, NoteError> {
    let partition = project.partition();
    debug!(%partition, "fetching notes");
    self
      .bounded(self.store.notes(&partition))
      .await
      .map_err(|e| fetch_error("notes", e))
  }

  /// Create a note under the project. Uniqueness of `id` is the caller's job.
  pub async fn create_note(
    &self,
    project: &Project,
    id: NoteId,
    content: NoteContent,
  ) -> Result<Note, NoteError> {
    let input = NoteInsertInput::new(project, id, content);
    debug!(note = %input.id, "creating note");
    self
      .bounded(self.store.insert_one(&input))
      .await
      .map_err(|e| mutation_error("create", e))
  }

  /// Apply a partial patch. An empty patch is sent as-is.
  pub async fn update_note(&self, id: &NoteId, updates: &NoteUpdates) -> Result<Note, NoteError> {
    debug!(note = %id, "updating note");
    self
      .bounded(self.store.update_one(id, updates))
      .await
      .map_err(|e| mutation_error("update", e))
  }

  /// Delete a note, returning its tombstone
  pub async fn delete_note(&self, id: &NoteId) -> Result<DeletedNote, NoteError> {
    debug!(note = %id, "deleting note");
    self
      .bounded(self.store.delete_one(id))
      .await
      .map_err(|e| mutation_error("delete", e))
  }

  async fn bounded<T, F>(&self, call: F) -> Result<T, CallError>
  where
    F: Future<Output = Result<T, TransportError>>,
  {
    match tokio::time::timeout(self.timeout, call).await {
      Ok(Ok(value)) => Ok(value),
      Ok(Err(e)) => Err(CallError::Transport(e)),
      Err(_) => Err(CallError::TimedOut(self.timeout)),
    }
  }
}

enum CallError {
  Transport(TransportError),
  TimedOut(Duration),
}

impl CallError {
  fn message(self) -> String {
    match self {
      CallError::Transport(e) => e.to_string(),
      CallError::TimedOut(after) => format!("request timed out after {}s", after.as_secs_f32()),
    }
  }
}

fn fetch_error(operation: &str, err: CallError) -> NoteError {
  let message = err.message();
  warn!(operation, error = %message, "note read failed");
  NoteError::Fetch(message)
}

fn mutation_error(operation: &str, err: CallError) -> NoteError {
  let message = err.message();
  warn!(operation, error = %message, "note mutation failed");
  NoteError::Mutation(message)
}
