//! In-memory note store for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use super::api_types::NoteInsertInput;
use super::error::TransportError;
use super::transport::NoteStore;
use super::types::{DeletedNote, Note, NoteId, NoteUpdates, Partition};

/// Note store backed by a `Vec`, with switchable failure injection.
///
/// Deletes of unknown ids still return a tombstone so repeated deletes
/// behave like a server that treats them as no-ops.
#[derive(Default)]
pub struct MockNoteStore {
  notes: Mutex<Vec<Note>>,
  fail: AtomicBool,
  reads: AtomicUsize,
}

impl MockNoteStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_notes(notes: Vec<Note>) -> Self {
    Self {
      notes: Mutex::new(notes),
      ..Self::default()
    }
  }

  /// Make every following call fail (or succeed again)
  pub fn set_failing(&self, fail: bool) {
    self.fail.store(fail, Ordering::SeqCst);
  }

  /// Number of read calls that reached the store
  pub fn read_count(&self) -> usize {
    self.reads.load(Ordering::SeqCst)
  }

  fn check(&self) -> Result<(), TransportError> {
    if self.fail.load(Ordering::SeqCst) {
      return Err(TransportError::Graphql("store unavailable".to_string()));
    }
    Ok(())
  }
}

#[async_trait]
impl NoteStore for MockNoteStore {
  async fn note(&self, id: &NoteId, partition: &Partition) -> Result<Option<Note>, TransportError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    self.check()?;
    let notes = self.notes.lock().unwrap();
    Ok(
      notes
        .iter()
        .find(|n| &n.id == id && &n.partition == partition)
        .cloned(),
    )
  }

  async fn notes(&self, partition: &Partition) -> Result<Vec<Note>, TransportError> {
    self.reads.fetch_add(1, Ordering::SeqCst);
    self.check()?;
    let notes = self.notes.lock().unwrap();
    Ok(
      notes
        .iter()
        .filter(|n| &n.partition == partition)
        .cloned()
        .collect(),
    )
  }

  async fn insert_one(&self, input: &NoteInsertInput) -> Result<Note, TransportError> {
    self.check()?;
    let note = Note {
      id: input.id.clone(),
      partition: input.partition.clone(),
      blocks: input.blocks.clone(),
    };
    self.notes.lock().unwrap().push(note.clone());
    Ok(note)
  }

  async fn update_one(&self, id: &NoteId, updates: &NoteUpdates) -> Result<Note, TransportError> {
    self.check()?;
    let mut notes = self.notes.lock().unwrap();
    let note = notes
      .iter_mut()
      .find(|n| &n.id == id)
      .ok_or_else(|| TransportError::Graphql(format!("note {} not found", id)))?;
    if let Some(blocks) = &updates.blocks {
      note.blocks = blocks.clone();
    }
    Ok(note.clone())
  }

  async fn delete_one(&self, id: &NoteId) -> Result<DeletedNote, TransportError> {
    self.check()?;
    let mut notes = self.notes.lock().unwrap();
    let partition = notes
      .iter()
      .find(|n| &n.id == id)
      .map(|n| n.partition.clone());
    notes.retain(|n| &n.id != id);
    Ok(DeletedNote {
      id: id.clone(),
      partition: partition.unwrap_or_else(|| Partition::from_raw("")),
    })
  }
}

/// Note with a single paragraph
pub fn note(id: &str, partition: &str, text: &str) -> Note {
  Note {
    id: NoteId::new(id),
    partition: Partition::from_raw(partition),
    blocks: vec![super::types::Block::paragraph(text)],
  }
}
