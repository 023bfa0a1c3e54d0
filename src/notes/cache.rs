//! Caching implementations for note types.

use sha2::{Digest, Sha256};

use crate::cache::{CacheRef, Cacheable, QueryKey};

use super::types::{Note, NoteId, Project};

impl Cacheable for Note {
  fn cache_key(&self) -> String {
    self.id.as_str().to_string()
  }

  fn entity_type() -> &'static str {
    "Note"
  }
}

/// Token of a note given only its id (e.g. from a tombstone)
pub fn note_ref(id: &NoteId) -> CacheRef {
  CacheRef::new(Note::entity_type(), id.as_str())
}

/// Query key types for note reads.
#[derive(Clone, Debug)]
pub enum NoteQueryKey {
  /// Every note visible under a project
  ProjectNotes { project_id: String },
}

impl NoteQueryKey {
  pub fn project_notes(project: &Project) -> Self {
    Self::ProjectNotes {
      project_id: project.id.clone(),
    }
  }
}

impl QueryKey for NoteQueryKey {
  fn cache_hash(&self) -> String {
    let input = match self {
      Self::ProjectNotes { project_id } => format!("notes:{}", project_id),
    };

    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
  }

  fn description(&self) -> String {
    match self {
      Self::ProjectNotes { project_id } => format!("notes for project {}", project_id),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::mock::note;

  #[test]
  fn test_note_ref_matches_entity_ref() {
    let n = note("abc", "note=P1", "x");
    assert_eq!(n.cache_ref(), note_ref(&NoteId::new("abc")));
    assert_eq!(n.cache_ref().as_str(), "Note:abc");
  }

  #[test]
  fn test_project_keys_are_distinct_and_stable() {
    let p1 = NoteQueryKey::project_notes(&Project::new("P1"));
    let p2 = NoteQueryKey::project_notes(&Project::new("P2"));
    assert_eq!(p1.cache_hash(), p1.clone().cache_hash());
    assert_ne!(p1.cache_hash(), p2.cache_hash());
    assert_eq!(p1.cache_hash().len(), 64);
  }
}
