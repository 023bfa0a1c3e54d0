//! Typed GraphQL documents, variables and response payloads.
//!
//! Every operation against the note store has its own request and response
//! record so call sites never poke at untyped JSON.

use serde::{Deserialize, Serialize};

use super::types::{Block, DeletedNote, Note, NoteContent, NoteId, NoteUpdates, Partition, Project};

// ============================================================================
// Documents
// ============================================================================

const NOTE_FIELDS: &str = r#"
fragment NoteFields on Note {
  _id
  _partition
  blocks {
    type
    children {
      text
      type
      bold
      italic
      underline
      strikethrough
      linkNoteId
    }
  }
}
"#;

pub const GET_NOTE: &str = r#"
query GetNote($noteId: ObjectId!, $partition: String!) {
  note(query: { _id: $noteId, _partition: $partition }) {
    ...NoteFields
  }
}
"#;

pub const GET_NOTES: &str = r#"
query GetNotes($partition: String!) {
  notes(query: { _partition: $partition }) {
    ...NoteFields
  }
}
"#;

pub const CREATE_NOTE: &str = r#"
mutation CreateNote($note: NoteInsertInput!) {
  createdNote: insertOneNote(data: $note) {
    ...NoteFields
  }
}
"#;

pub const UPDATE_NOTE: &str = r#"
mutation UpdateNote($noteId: ObjectId!, $updates: NoteUpdateInput!) {
  updatedNote: updateOneNote(query: { _id: $noteId }, set: $updates) {
    ...NoteFields
  }
}
"#;

// The tombstone carries identity only, so no fragment here.
pub const DELETE_NOTE: &str = r#"
mutation DeleteNote($noteId: ObjectId!) {
  deletedNote: deleteOneNote(query: { _id: $noteId }) {
    _id
    _partition
  }
}
"#;

/// Append the shared fragment to documents that spread it
pub fn with_fragments(document: &str) -> String {
  if document.contains("...NoteFields") {
    format!("{}{}", document, NOTE_FIELDS)
  } else {
    document.to_string()
  }
}

// ============================================================================
// Envelope
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GraphqlRequest<'a, V: Serialize> {
  pub query: String,
  #[serde(rename = "operationName")]
  pub operation_name: &'a str,
  pub variables: V,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlError {
  pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphqlResponse<D> {
  pub data: Option<D>,
  #[serde(default)]
  pub errors: Vec<GraphqlError>,
}

impl<D> GraphqlResponse<D> {
  /// Server reported errors joined into one message, if any
  pub fn error_message(&self) -> Option<String> {
    if self.errors.is_empty() {
      return None;
    }
    Some(
      self
        .errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; "),
    )
  }
}

// ============================================================================
// Variables
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNoteVars<'a> {
  pub note_id: &'a str,
  pub partition: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetNotesVars<'a> {
  pub partition: &'a str,
}

/// Insert record: identity and ownership merged with the caller's content
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteInsertInput {
  #[serde(rename = "_id")]
  pub id: NoteId,
  #[serde(rename = "_partition")]
  pub partition: Partition,
  #[serde(rename = "ownerId")]
  pub owner_id: String,
  pub blocks: Vec<Block>,
}

impl NoteInsertInput {
  pub fn new(project: &Project, id: NoteId, content: NoteContent) -> Self {
    Self {
      id,
      partition: project.partition(),
      owner_id: project.id.clone(),
      blocks: content.blocks,
    }
  }
}

#[derive(Debug, Serialize)]
pub struct CreateNoteVars<'a> {
  pub note: &'a NoteInsertInput,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteVars<'a> {
  pub note_id: &'a str,
  pub updates: &'a NoteUpdates,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNoteVars<'a> {
  pub note_id: &'a str,
}

// ============================================================================
// Response data
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct GetNoteData {
  pub note: Option<Note>,
}

#[derive(Debug, Deserialize)]
pub struct GetNotesData {
  #[serde(default)]
  pub notes: Vec<Option<Note>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteData {
  pub created_note: Note,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteData {
  pub updated_note: Note,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteNoteData {
  pub deleted_note: DeletedNote,
}
