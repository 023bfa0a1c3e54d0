use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The scope that owns a set of notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
  pub id: String,
}

impl Project {
  pub fn new(id: impl Into<String>) -> Self {
    Self { id: id.into() }
  }

  /// Partition key every note of this project is stored under
  pub fn partition(&self) -> Partition {
    Partition::from_raw(format!("note={}", self.id))
  }
}

/// Note identity, assigned by the client when the note is created
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
  pub fn new(id: impl Into<String>) -> Self {
    Self(id.into())
  }

  /// Generate a fresh identifier for a note that doesn't exist yet.
  ///
  /// ObjectId layout: 4-byte big-endian seconds since the epoch followed by
  /// 8 random bytes, as 24 lowercase hex digits.
  pub fn generate() -> Self {
    let seconds = chrono::Utc::now().timestamp() as u32;
    let random = uuid::Uuid::new_v4();

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..].copy_from_slice(&random.as_bytes()[..8]);
    Self(hex::encode(bytes))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for NoteId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Partition value (`note=<project id>`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Partition(String);

impl Partition {
  /// Wrap a partition value as received from the store
  pub fn from_raw(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for Partition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// A note as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
  #[serde(rename = "_id")]
  pub id: NoteId,
  #[serde(rename = "_partition")]
  pub partition: Partition,
  #[serde(default, deserialize_with = "null_as_default")]
  pub blocks: Vec<Block>,
}

/// Content block within a note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
  #[serde(rename = "type")]
  pub kind: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub children: Vec<InlineSpan>,
}

impl Block {
  /// Plain paragraph holding a single unstyled span
  pub fn paragraph(text: impl Into<String>) -> Self {
    Self {
      kind: "paragraph".to_string(),
      children: vec![InlineSpan::text(text)],
    }
  }

  /// Concatenated text of all spans
  pub fn plain_text(&self) -> String {
    self.children.iter().map(|s| s.text.as_str()).collect()
  }
}

/// Leaf text run with independent style flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineSpan {
  #[serde(default, deserialize_with = "null_as_default")]
  pub text: String,
  #[serde(rename = "type", default, deserialize_with = "null_as_default")]
  pub kind: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub bold: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub italic: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub underline: bool,
  #[serde(default, deserialize_with = "null_as_default")]
  pub strikethrough: bool,
  /// Weak link to another note; the target may have been deleted
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub link_note_id: Option<NoteId>,
}

impl InlineSpan {
  pub fn text(text: impl Into<String>) -> Self {
    Self {
      text: text.into(),
      kind: "text".to_string(),
      ..Self::default()
    }
  }
}

/// Fields supplied by the caller when creating a note
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteContent {
  pub blocks: Vec<Block>,
}

/// Partial patch for an existing note. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NoteUpdates {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub blocks: Option<Vec<Block>>,
}

/// Identity of a deleted note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedNote {
  #[serde(rename = "_id")]
  pub id: NoteId,
  #[serde(rename = "_partition")]
  pub partition: Partition,
}

/// GraphQL nulls for lists, strings and flags read as their empty value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_partition_is_derived_from_project() {
    let project = Project::new("P1");
    assert_eq!(project.partition().as_str(), "note=P1");
  }

  #[test]
  fn test_generated_ids_are_unique() {
    assert_ne!(NoteId::generate(), NoteId::generate());
  }

  #[test]
  fn test_generated_id_has_object_id_shape() {
    let id = NoteId::generate();
    assert_eq!(id.as_str().len(), 24);
    assert!(id
      .as_str()
      .chars()
      .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));

    let seconds = u32::from_str_radix(&id.as_str()[..8], 16).unwrap();
    let now = chrono::Utc::now().timestamp() as u32;
    assert!(now.abs_diff(seconds) <= 1);
  }

  #[test]
  fn test_note_deserializes_wire_names() {
    let json = serde_json::json!({
      "_id": "n1",
      "_partition": "note=P1",
      "blocks": [{
        "type": "paragraph",
        "children": [{
          "text": "hello",
          "type": "text",
          "bold": true,
          "italic": null,
          "underline": false,
          "strikethrough": null,
          "linkNoteId": "n2"
        }]
      }]
    });

    let note: Note = serde_json::from_value(json).unwrap();
    assert_eq!(note.id, NoteId::new("n1"));
    assert_eq!(note.partition.as_str(), "note=P1");
    let span = &note.blocks[0].children[0];
    assert!(span.bold);
    assert!(!span.italic);
    assert!(!span.strikethrough);
    assert_eq!(span.link_note_id, Some(NoteId::new("n2")));
  }

  #[test]
  fn test_null_blocks_read_as_empty() {
    let json = serde_json::json!({ "_id": "n1", "_partition": "note=P1", "blocks": null });
    let note: Note = serde_json::from_value(json).unwrap();
    assert!(note.blocks.is_empty());
  }

  #[test]
  fn test_empty_updates_serialize_to_empty_object() {
    let value = serde_json::to_value(NoteUpdates::default()).unwrap();
    assert_eq!(value, serde_json::json!({}));
  }

  #[test]
  fn test_block_plain_text() {
    let block = Block {
      kind: "paragraph".to_string(),
      children: vec![InlineSpan::text("foo "), InlineSpan::text("bar")],
    };
    assert_eq!(block.plain_text(), "foo bar");
  }
}
