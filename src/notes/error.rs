//! Error types for note operations.

/// Failure talking to the note store
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),
  /// The server answered with a GraphQL `errors` array
  #[error("{0}")]
  Graphql(String),
  #[error("Unexpected response: {0}")]
  InvalidResponse(String),
}

/// Errors surfaced to callers of note operations.
///
/// A missing note is not an error; reads return `None` for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteError {
  /// Read path failed
  #[error("Failed to fetch notes: {0}")]
  Fetch(String),
  /// Create, update or delete failed
  #[error("Failed to save note: {0}")]
  Mutation(String),
}

impl NoteError {
  /// Underlying message without the kind prefix
  pub fn message(&self) -> &str {
    match self {
      NoteError::Fetch(msg) | NoteError::Mutation(msg) => msg,
    }
  }
}

/// Cache storage failures only occur on the read path
impl From<color_eyre::Report> for NoteError {
  fn from(err: color_eyre::Report) -> Self {
    NoteError::Fetch(err.to_string())
  }
}

/// Only mutations run as detached tasks that can vanish
impl From<crate::query::Cancelled> for NoteError {
  fn from(err: crate::query::Cancelled) -> Self {
    NoteError::Mutation(err.to_string())
  }
}
