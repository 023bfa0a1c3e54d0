//! One note of one project, as seen by the presentation layer.
//!
//! The view model owns the read query for its note, a read of the project's
//! note list, and at most one mutation in flight. Errors are kept as-is for
//! the view to display. After a confirmed mutation the list is read again;
//! it is served from the patched cache, not the store.

use crate::query::{Mutation, Query, QueryState};

use super::cached_client::CachedNoteClient;
use super::error::NoteError;
use super::types::{Note, NoteContent, NoteId, NoteUpdates, Project};

/// What a finished mutation did to the note
#[derive(Debug)]
enum Outcome {
  Saved(Note),
  Deleted,
}

pub struct NoteViewModel {
  project: Project,
  note_id: NoteId,
  client: CachedNoteClient,
  query: Query<Option<Note>, NoteError>,
  notes: Query<Vec<Note>, NoteError>,
  mutation: Mutation<Outcome, NoteError>,
  mutation_error: Option<NoteError>,
}

impl NoteViewModel {
  /// Bind to `note_id` in `project` and start loading it.
  pub fn new(client: CachedNoteClient, project: Project, note_id: NoteId) -> Self {
    let mut query = {
      let client = client.clone();
      let project = project.clone();
      let note_id = note_id.clone();
      Query::new(move || {
        let client = client.clone();
        let project = project.clone();
        let note_id = note_id.clone();
        async move { client.note(&project, &note_id).await }
      })
    };
    query.fetch();

    let mut notes = {
      let client = client.clone();
      let project = project.clone();
      Query::new(move || {
        let client = client.clone();
        let project = project.clone();
        async move { client.notes(&project).await }
      })
    };
    notes.fetch();

    Self {
      project,
      note_id,
      client,
      query,
      notes,
      mutation: Mutation::new(),
      mutation_error: None,
    }
  }

  pub fn project(&self) -> &Project {
    &self.project
  }

  pub fn note_id(&self) -> &NoteId {
    &self.note_id
  }

  /// True until the first read has answered, and during refreshes
  pub fn loading(&self) -> bool {
    matches!(self.query.state(), QueryState::Idle | QueryState::Loading)
  }

  /// The note, if it exists
  pub fn note(&self) -> Option<&Note> {
    self.query.data().and_then(Option::as_ref)
  }

  /// Last read failure
  pub fn error(&self) -> Option<&NoteError> {
    self.query.error()
  }

  /// Every note of the project, once loaded
  pub fn project_notes(&self) -> Option<&[Note]> {
    self.notes.data().map(Vec::as_slice)
  }

  pub fn project_notes_loading(&self) -> bool {
    matches!(self.notes.state(), QueryState::Idle | QueryState::Loading)
  }

  /// Last failure reading the project's notes
  pub fn project_notes_error(&self) -> Option<&NoteError> {
    self.notes.error()
  }

  /// Last mutation failure, cleared when the next mutation starts
  pub fn mutation_error(&self) -> Option<&NoteError> {
    self.mutation_error.as_ref()
  }

  pub fn is_mutating(&self) -> bool {
    self.mutation.is_running()
  }

  /// Read the note and the project's notes again
  pub fn refresh(&mut self) {
    self.query.refetch();
    self.notes.refetch();
  }

  /// Create the note under `id`. Returns false if a mutation is in flight.
  pub fn create_note(&mut self, id: NoteId, content: NoteContent) -> bool {
    let client = self.client.clone();
    let project = self.project.clone();
    self.start(async move {
      client
        .create_note(&project, id, content)
        .await
        .map(Outcome::Saved)
    })
  }

  /// Apply `updates` to the bound note. Returns false if a mutation is in flight.
  pub fn update_note(&mut self, updates: NoteUpdates) -> bool {
    let client = self.client.clone();
    let project = self.project.clone();
    let id = self.note_id.clone();
    self.start(async move {
      client
        .update_note(&project, &id, &updates)
        .await
        .map(Outcome::Saved)
    })
  }

  /// Delete the bound note. Returns false if a mutation is in flight.
  pub fn delete_note(&mut self) -> bool {
    let client = self.client.clone();
    let project = self.project.clone();
    let id = self.note_id.clone();
    self.start(async move {
      client
        .delete_note(&project, &id)
        .await
        .map(|_| Outcome::Deleted)
    })
  }

  fn start<Fut>(&mut self, call: Fut) -> bool
  where
    Fut: std::future::Future<Output = Result<Outcome, NoteError>> + Send + 'static,
  {
    let started = self.mutation.run(call);
    if started {
      self.mutation_error = None;
    }
    started
  }

  /// Poll the read and any pending mutation. Returns true if anything changed.
  pub fn tick(&mut self) -> bool {
    let mut changed = self.query.poll();
    changed |= self.notes.poll();

    if let Some(result) = self.mutation.poll() {
      changed = true;
      match result {
        Ok(Outcome::Saved(note)) => {
          self.query.set_data(Some(note));
          self.notes.refetch();
        }
        Ok(Outcome::Deleted) => {
          self.query.set_data(None);
          self.notes.refetch();
        }
        Err(e) => self.mutation_error = Some(e),
      }
    }

    changed
  }
}
