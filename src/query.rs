//! Async query and mutation handles polled from the UI tick.
//!
//! A `Query<T, E>` owns a fetcher it can re-run; a `Mutation<T, E>` runs one
//! future to completion. Both spawn the work on tokio and hand the result
//! back through a channel, so the render loop never awaits.
//!
//! ```ignore
//! let mut query = Query::new(move || {
//!     let client = client.clone();
//!     async move { client.note(&project, &id).await }
//! });
//!
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//! ```

use futures::future::BoxFuture;
use std::future::Future;
use tokio::sync::oneshot;
use tracing::warn;

/// The state of a query
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T, E> {
  /// Query has not been started
  Idle,
  /// Query is currently fetching data
  Loading,
  /// Query completed successfully
  Success(T),
  /// Query failed with an error
  Error(E),
}

impl<T, E> QueryState<T, E> {
  pub fn is_loading(&self) -> bool {
    matches!(self, QueryState::Loading)
  }

  pub fn data(&self) -> Option<&T> {
    match self {
      QueryState::Success(data) => Some(data),
      _ => None,
    }
  }

  pub fn error(&self) -> Option<&E> {
    match self {
      QueryState::Error(e) => Some(e),
      _ => None,
    }
  }
}

/// A factory function that creates futures for fetching data
type FetcherFn<T, E> = Box<dyn Fn() -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Re-runnable async read with loading/success/error state.
pub struct Query<T, E> {
  state: QueryState<T, E>,
  fetcher: FetcherFn<T, E>,
  pending: Pending<T, E>,
}

impl<T: Send + 'static, E: Send + 'static> Query<T, E> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher is called each time `fetch()` or `refetch()` is invoked.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    Self {
      state: QueryState::Idle,
      fetcher: Box::new(move || Box::pin(fetcher())),
      pending: Pending::default(),
    }
  }

  /// Get the current state of the query.
  pub fn state(&self) -> &QueryState<T, E> {
    &self.state
  }

  /// Get the data if the query succeeded.
  pub fn data(&self) -> Option<&T> {
    self.state.data()
  }

  /// Check if the query is currently loading.
  pub fn is_loading(&self) -> bool {
    self.state.is_loading()
  }

  /// Get the error if the query failed.
  pub fn error(&self) -> Option<&E> {
    self.state.error()
  }

  /// Start fetching data if not already loading.
  pub fn fetch(&mut self) {
    if self.state.is_loading() {
      return;
    }
    self.start_fetch();
  }

  /// Force a refetch. A result still in flight is discarded.
  pub fn refetch(&mut self) {
    self.start_fetch();
  }

  /// Overwrite the state with a known value (e.g. a mutation result),
  /// discarding any fetch in flight.
  pub fn set_data(&mut self, data: T) {
    self.pending = Pending::default();
    self.state = QueryState::Success(data);
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed. Call this in the tick handler.
  pub fn poll(&mut self) -> bool {
    match self.pending.poll() {
      Some(Ok(result)) => {
        self.state = match result {
          Ok(data) => QueryState::Success(data),
          Err(e) => QueryState::Error(e),
        };
        true
      }
      Some(Err(Cancelled)) => {
        // Task dropped without answering; allow a new fetch
        self.state = QueryState::Idle;
        true
      }
      None => false,
    }
  }

  fn start_fetch(&mut self) {
    self.state = QueryState::Loading;
    self.pending = Pending::spawn((self.fetcher)());
  }
}

impl<T: std::fmt::Debug, E: std::fmt::Debug> std::fmt::Debug for Query<T, E> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("state", &self.state)
      .finish_non_exhaustive()
  }
}

/// One-shot async write. Holds at most one call in flight.
pub struct Mutation<T, E> {
  pending: Pending<T, E>,
}

impl<T: Send + 'static, E: Send + 'static> Mutation<T, E> {
  pub fn new() -> Self {
    Self {
      pending: Pending::default(),
    }
  }

  /// Whether a call is in flight
  pub fn is_running(&self) -> bool {
    self.pending.is_active()
  }

  /// Start a call. Returns false (and drops `call`) if one is already running.
  pub fn run<Fut>(&mut self, call: Fut) -> bool
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    if self.is_running() {
      return false;
    }
    self.pending = Pending::spawn(call);
    true
  }

  /// Take the result once the call has finished.
  ///
  /// `None` while running or idle. A call whose task ended without
  /// answering (e.g. it panicked) is reported as a `Cancelled` error.
  pub fn poll(&mut self) -> Option<Result<T, E>>
  where
    E: From<Cancelled>,
  {
    match self.pending.poll()? {
      Ok(result) => Some(result),
      Err(cancelled) => {
        warn!("mutation task ended without a result");
        Some(Err(E::from(cancelled)))
      }
    }
  }
}

impl<T: Send + 'static, E: Send + 'static> Default for Mutation<T, E> {
  fn default() -> Self {
    Self::new()
  }
}

/// A spawned task ended without sending its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("operation was cancelled before it finished")]
pub struct Cancelled;

/// Receiver side of a spawned task
struct Pending<T, E> {
  receiver: Option<oneshot::Receiver<Result<T, E>>>,
}

impl<T, E> Default for Pending<T, E> {
  fn default() -> Self {
    Self { receiver: None }
  }
}

impl<T: Send + 'static, E: Send + 'static> Pending<T, E> {
  fn spawn<Fut>(future: Fut) -> Self
  where
    Fut: Future<Output = Result<T, E>> + Send + 'static,
  {
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(future.await);
    });
    Self { receiver: Some(rx) }
  }

  fn is_active(&self) -> bool {
    self.receiver.is_some()
  }

  fn poll(&mut self) -> Option<Result<Result<T, E>, Cancelled>> {
    let receiver = self.receiver.as_mut()?;
    match receiver.try_recv() {
      Ok(result) => {
        self.receiver = None;
        Some(Ok(result))
      }
      Err(oneshot::error::TryRecvError::Empty) => None,
      Err(oneshot::error::TryRecvError::Closed) => {
        self.receiver = None;
        Some(Err(Cancelled))
      }
    }
  }
}
