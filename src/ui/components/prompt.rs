//! Confirmation prompt: shows a line of text and fires once on Enter.

use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// A prompt that emits `on_confirm` when Enter is pressed.
///
/// Every other key is left to the parent, so the prompt can stay on screen
/// while the rest of the view keeps working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt<T> {
  prompt_text: String,
  on_confirm: T,
}

impl<T: Clone> ConfirmPrompt<T> {
  pub fn new(prompt_text: impl Into<String>, on_confirm: T) -> Self {
    Self {
      prompt_text: prompt_text.into(),
      on_confirm,
    }
  }

  pub fn prompt_text(&self) -> &str {
    &self.prompt_text
  }

  pub fn handle_key(&self, key: KeyEvent) -> KeyResult<T> {
    match key.code {
      KeyCode::Enter => KeyResult::Event(self.on_confirm.clone()),
      _ => KeyResult::NotHandled,
    }
  }

  pub fn render(&self, frame: &mut Frame, area: Rect) {
    let line = Line::from(vec![
      Span::raw(" "),
      Span::styled(&self.prompt_text, Style::default().fg(Color::Yellow).bold()),
      Span::styled(" ⏎", Style::default().fg(Color::Cyan)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }
}
