//! Note store transport: the remote contract and its GraphQL-over-HTTP client.

use async_trait::async_trait;
use color_eyre::{eyre::eyre, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Config;

use super::api_types::{
  with_fragments, CreateNoteData, CreateNoteVars, DeleteNoteData, DeleteNoteVars, GetNoteData,
  GetNoteVars, GetNotesData, GetNotesVars, GraphqlRequest, GraphqlResponse, NoteInsertInput,
  UpdateNoteData, UpdateNoteVars, CREATE_NOTE, DELETE_NOTE, GET_NOTE, GET_NOTES, UPDATE_NOTE,
};
use super::error::TransportError;
use super::types::{DeletedNote, Note, NoteId, NoteUpdates, Partition};

/// The operations the remote note store exposes.
///
/// Implementations only move records; they know nothing about caching.
#[async_trait]
pub trait NoteStore: Send + Sync {
  /// `note(query: {_id, _partition})`
  async fn note(&self, id: &NoteId, partition: &Partition) -> Result<Option<Note>, TransportError>;

  /// `notes(query: {_partition})`
  async fn notes(&self, partition: &Partition) -> Result<Vec<Note>, TransportError>;

  /// `insertOneNote(data)`
  async fn insert_one(&self, input: &NoteInsertInput) -> Result<Note, TransportError>;

  /// `updateOneNote(query: {_id}, set)`
  async fn update_one(&self, id: &NoteId, updates: &NoteUpdates) -> Result<Note, TransportError>;

  /// `deleteOneNote(query: {_id})`
  async fn delete_one(&self, id: &NoteId) -> Result<DeletedNote, TransportError>;
}

/// GraphQL client for the note store
#[derive(Clone)]
pub struct GraphqlClient {
  client: reqwest::Client,
  endpoint: url::Url,
}

impl GraphqlClient {
  pub fn new(config: &Config) -> Result<Self> {
    let mut headers = HeaderMap::new();
    if let Some(token) = Config::get_api_token() {
      let value = HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| eyre!("Invalid API token: {}", e))?;
      headers.insert(AUTHORIZATION, value);
    }

    let client = reqwest::Client::builder()
      .default_headers(headers)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      client,
      endpoint: config.api.url.clone(),
    })
  }

  /// Host shown in the header bar
  pub fn host(&self) -> &str {
    self.endpoint.host_str().unwrap_or("")
  }

  async fn execute<V, D>(
    &self,
    operation_name: &str,
    document: &str,
    variables: V,
  ) -> Result<D, TransportError>
  where
    V: Serialize,
    D: DeserializeOwned,
  {
    let request = GraphqlRequest {
      query: with_fragments(document),
      operation_name,
      variables,
    };

    debug!(operation = operation_name, "sending GraphQL request");

    let response: GraphqlResponse<D> = self
      .client
      .post(self.endpoint.clone())
      .json(&request)
      .send()
      .await?
      .error_for_status()?
      .json()
      .await?;

    if let Some(message) = response.error_message() {
      return Err(TransportError::Graphql(message));
    }

    response
      .data
      .ok_or_else(|| TransportError::InvalidResponse(format!("{} returned no data", operation_name)))
  }
}

#[async_trait]
impl NoteStore for GraphqlClient {
  async fn note(&self, id: &NoteId, partition: &Partition) -> Result<Option<Note>, TransportError> {
    let data: GetNoteData = self
      .execute(
        "GetNote",
        GET_NOTE,
        GetNoteVars {
          note_id: id.as_str(),
          partition: partition.as_str(),
        },
      )
      .await?;
    Ok(data.note)
  }

  async fn notes(&self, partition: &Partition) -> Result<Vec<Note>, TransportError> {
    let data: GetNotesData = self
      .execute(
        "GetNotes",
        GET_NOTES,
        GetNotesVars {
          partition: partition.as_str(),
        },
      )
      .await?;
    Ok(data.notes.into_iter().flatten().collect())
  }

  async fn insert_one(&self, input: &NoteInsertInput) -> Result<Note, TransportError> {
    let data: CreateNoteData = self
      .execute("CreateNote", CREATE_NOTE, CreateNoteVars { note: input })
      .await?;
    Ok(data.created_note)
  }

  async fn update_one(&self, id: &NoteId, updates: &NoteUpdates) -> Result<Note, TransportError> {
    let data: UpdateNoteData = self
      .execute(
        "UpdateNote",
        UPDATE_NOTE,
        UpdateNoteVars {
          note_id: id.as_str(),
          updates,
        },
      )
      .await?;
    Ok(data.updated_note)
  }

  async fn delete_one(&self, id: &NoteId) -> Result<DeletedNote, TransportError> {
    let data: DeleteNoteData = self
      .execute(
        "DeleteNote",
        DELETE_NOTE,
        DeleteNoteVars {
          note_id: id.as_str(),
        },
      )
      .await?;
    Ok(data.deleted_note)
  }
}
