use crate::event::{Event, EventHandler};
use crate::notes::cached_client::CachedNoteClient;
use crate::notes::types::{NoteId, Project};
use crate::ui;
use crate::ui::view::{View, ViewAction};
use crate::ui::views::NoteView;
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::info;

/// Main application state
pub struct App {
  /// The note on screen
  view: Box<dyn View>,

  /// Host of the note store, for the header
  host: String,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(client: CachedNoteClient, project: Project, note_id: NoteId) -> Self {
    info!(project = %project.id, note = %note_id, "opening note");
    let host = client.host().to_string();
    Self {
      view: Box::new(NoteView::new(client, project, note_id)),
      host,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let result = self.event_loop().await;

    // Cleanup terminal even if the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Reader task lives until this function returns
    let mut events = EventHandler::new(Duration::from_millis(100));

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.view.tick(),
      Event::Resize => {}
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    if self.view.handle_key(key) == ViewAction::Quit {
      self.should_quit = true;
    }
  }

  // Accessors for UI rendering
  pub fn host(&self) -> &str {
    &self.host
  }

  pub fn view_mut(&mut self) -> &mut dyn View {
    self.view.as_mut()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::mock::MockNoteStore;
  use std::sync::Arc;

  fn app() -> App {
    let client = CachedNoteClient::with_store(Arc::new(MockNoteStore::new()));
    App::new(client, Project::new("P1"), NoteId::new("N1"))
  }

  #[tokio::test]
  async fn test_ctrl_c_quits() {
    let mut app = app();
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit);
  }

  #[tokio::test]
  async fn test_q_quits_through_view() {
    let mut app = app();
    app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)));
    assert!(app.should_quit);
  }
}
