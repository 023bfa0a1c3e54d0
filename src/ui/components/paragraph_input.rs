use super::input::{InputResult, TextInput};
use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

/// Events emitted by the paragraph input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParagraphEvent {
  /// Enter pressed with non-blank text
  Submitted(String),
  /// Esc pressed, or Enter on blank text
  Cancelled,
}

/// Overlay for typing a paragraph to append to the note
#[derive(Debug, Clone, Default)]
pub struct ParagraphInput {
  input: TextInput,
  active: bool,
}

impl ParagraphInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.input.clear();
  }

  /// Handle a key event
  /// Call this regardless of active state - it handles activation on `a` too
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<ParagraphEvent> {
    if !self.active {
      if key.code == KeyCode::Char('a') && key.modifiers.is_empty() {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match self.input.handle_key(key) {
      InputResult::Submitted(text) => {
        self.active = false;
        self.input.clear();
        let text = text.trim();
        if text.is_empty() {
          KeyResult::Event(ParagraphEvent::Cancelled)
        } else {
          KeyResult::Event(ParagraphEvent::Submitted(text.to_string()))
        }
      }
      InputResult::Cancelled => {
        self.active = false;
        self.input.clear();
        KeyResult::Event(ParagraphEvent::Cancelled)
      }
      // Swallow everything else while typing
      InputResult::Consumed | InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// Render the overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let width = (area.width * 80 / 100).clamp(30.min(area.width), 100);
    let height = 3.min(area.height);
    let x = area.x + 1.min(area.width);
    let y = area.y + area.height.saturating_sub(height + 1);
    let overlay_area = Rect::new(x, y, width.min(area.width.saturating_sub(1)), height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Append paragraph ");

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let (before, after) = self.input.split_at_cursor();
    let line = Line::from(vec![
      Span::raw(before),
      Span::styled("_", Style::default().fg(Color::Yellow)),
      Span::raw(after),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
  }
}
