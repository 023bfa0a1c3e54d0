use crossterm::event::{self, Event as CrosstermEvent, KeyEvent, KeyEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Terminal was resized; redraw
  Resize,
  /// Periodic tick for UI refresh and query polling
  Tick,
}

/// Event handler that produces events from terminal input and a tick timer.
///
/// The reader task lives exactly as long as the handler: it is started in
/// `new` and aborted when the handler is dropped.
pub struct EventHandler {
  rx: mpsc::UnboundedReceiver<Event>,
  reader: JoinHandle<()>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let reader = tokio::spawn(async move {
      loop {
        let event = if event::poll(tick_rate).unwrap_or(false) {
          match event::read() {
            // Ignore key releases on platforms that report them
            Ok(CrosstermEvent::Key(key)) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
            Ok(CrosstermEvent::Resize(_, _)) => Some(Event::Resize),
            _ => None,
          }
        } else {
          Some(Event::Tick)
        };

        if let Some(event) = event {
          if tx.send(event).is_err() {
            break;
          }
        }

        // Give abort() a point to take effect
        tokio::task::yield_now().await;
      }
    });

    Self { rx, reader }
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}

impl Drop for EventHandler {
  fn drop(&mut self) {
    self.reader.abort();
  }
}
