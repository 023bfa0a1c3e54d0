use crate::notes::cached_client::CachedNoteClient;
use crate::notes::types::{Block as NoteBlock, Note, NoteContent, NoteId, NoteUpdates, Project};
use crate::notes::view_model::NoteViewModel;
use crate::ui::components::{ConfirmPrompt, KeyResult, ParagraphEvent, ParagraphInput};
use crate::ui::renderfns::{span_style, truncate, StatusLine};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

/// Width of the project notes panel
const PANEL_WIDTH: u16 = 28;

/// What the visible prompt does when confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAction {
  Create,
  Delete,
}

/// View of a single note with create/append/delete actions, next to a
/// panel listing every note of the project
pub struct NoteView {
  client: CachedNoteClient,
  vm: NoteViewModel,
  paragraph: ParagraphInput,
  confirm_delete: bool,
  /// Highlighted row of the notes panel
  selected: usize,
}

impl NoteView {
  pub fn new(client: CachedNoteClient, project: Project, note_id: NoteId) -> Self {
    Self {
      vm: NoteViewModel::new(client.clone(), project, note_id),
      client,
      paragraph: ParagraphInput::new(),
      confirm_delete: false,
      selected: 0,
    }
  }

  /// Rebind the view to another note of the same project
  fn open(&mut self, note_id: NoteId) {
    if &note_id == self.vm.note_id() || self.vm.is_mutating() {
      return;
    }
    let project = self.vm.project().clone();
    self.vm = NoteViewModel::new(self.client.clone(), project, note_id);
    self.confirm_delete = false;
  }

  fn open_selected(&mut self) {
    let id = self
      .vm
      .project_notes()
      .and_then(|notes| notes.get(self.selected))
      .map(|n| n.id.clone());
    if let Some(id) = id {
      self.open(id);
    }
  }

  fn follow_link(&mut self) {
    if let Some(id) = self.vm.note().and_then(first_link) {
      self.open(id);
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.vm.project_notes().map_or(0, |notes| notes.len());
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  /// Prompt currently on screen, if any
  fn prompt(&self) -> Option<ConfirmPrompt<PromptAction>> {
    if self.vm.is_mutating() {
      return None;
    }
    if self.confirm_delete {
      return Some(ConfirmPrompt::new("Delete note?", PromptAction::Delete));
    }
    if !self.vm.loading() && self.vm.error().is_none() && self.vm.note().is_none() {
      return Some(ConfirmPrompt::new("Create note", PromptAction::Create));
    }
    None
  }

  fn confirm(&mut self, action: PromptAction) {
    match action {
      PromptAction::Create => {
        let content = NoteContent {
          blocks: vec![NoteBlock::paragraph("")],
        };
        let id = self.vm.note_id().clone();
        self.vm.create_note(id, content);
      }
      PromptAction::Delete => {
        self.confirm_delete = false;
        self.vm.delete_note();
      }
    }
  }

  fn append_paragraph(&mut self, text: String) {
    let Some(note) = self.vm.note() else {
      return;
    };
    // Blank paragraphs (e.g. from a fresh note) are dropped
    let mut blocks: Vec<NoteBlock> = note
      .blocks
      .iter()
      .filter(|b| !(b.kind == "paragraph" && b.plain_text().is_empty()))
      .cloned()
      .collect();
    blocks.push(NoteBlock::paragraph(text));
    self.vm.update_note(NoteUpdates {
      blocks: Some(blocks),
    });
  }

  fn can_edit(&self) -> bool {
    self.vm.note().is_some() && !self.vm.is_mutating()
  }

  fn render_panel(&self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Notes ")
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::DarkGray));

    let Some(notes) = self.vm.project_notes() else {
      let text = match self.vm.project_notes_error() {
        Some(e) => Paragraph::new(e.message().to_string()).style(Style::default().fg(Color::Red)),
        None => Paragraph::new("Loading...").style(Style::default().fg(Color::DarkGray)),
      };
      frame.render_widget(text.block(block).wrap(Wrap { trim: true }), area);
      return;
    };

    let items: Vec<ListItem> = notes
      .iter()
      .map(|note| {
        let style = if &note.id == self.vm.note_id() {
          Style::default().fg(Color::Yellow).bold()
        } else {
          Style::default()
        };
        ListItem::new(Span::styled(note_title(note), style))
      })
      .collect();

    let list = List::new(items)
      .block(block)
      .highlight_symbol("> ")
      .highlight_style(Style::default().bg(Color::DarkGray));

    let mut state = ListState::default();
    if !notes.is_empty() {
      state.select(Some(self.selected.min(notes.len() - 1)));
    }
    frame.render_stateful_widget(list, area, &mut state);
  }

  fn render_note(&self, frame: &mut Frame, area: Rect) {
    let title = if self.vm.loading() {
      format!(" {} (loading...) ", self.vm.note_id())
    } else {
      format!(" {} ", self.vm.note_id())
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let prompt = self.prompt();
    let (body, prompt_area) = if prompt.is_some() && inner.height > 1 {
      let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
      (chunks[0], Some(chunks[1]))
    } else {
      (inner, None)
    };

    if let (Some(prompt), Some(prompt_area)) = (prompt, prompt_area) {
      prompt.render(frame, prompt_area);
    }

    if self.vm.loading() && self.vm.note().is_none() {
      let paragraph = Paragraph::new("Loading note...").style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, body);
      return;
    }

    if let Some(error) = self.vm.error() {
      let paragraph = Paragraph::new(format!("Error: {}\n\nPress 'r' to retry.", error.message()))
        .style(Style::default().fg(Color::Red))
        .wrap(Wrap { trim: true });
      frame.render_widget(paragraph, body);
      return;
    }

    match self.vm.note() {
      Some(note) => {
        let paragraph = Paragraph::new(note_lines(note)).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, body);
      }
      None => {
        let paragraph = Paragraph::new("This note does not exist yet.")
          .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(paragraph, body);
      }
    }
  }
}

/// Target of the first link in the note
fn first_link(note: &Note) -> Option<NoteId> {
  note
    .blocks
    .iter()
    .flat_map(|b| b.children.iter())
    .find_map(|span| span.link_note_id.clone())
}

/// Panel label: first non-blank text, or the id
fn note_title(note: &Note) -> String {
  let text = note
    .blocks
    .iter()
    .map(|b| b.plain_text())
    .find(|t| !t.trim().is_empty())
    .unwrap_or_else(|| note.id.to_string());
  truncate(text.trim(), PANEL_WIDTH as usize - 4)
}

/// One line per block, blank line between blocks
fn note_lines(note: &Note) -> Vec<Line<'_>> {
  let mut lines = Vec::new();
  for (i, block) in note.blocks.iter().enumerate() {
    if i > 0 {
      lines.push(Line::default());
    }
    let base = if block.kind.starts_with("heading") {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default()
    };
    let spans: Vec<Span> = block
      .children
      .iter()
      .map(|span| Span::styled(span.text.as_str(), base.patch(span_style(span))))
      .collect();
    lines.push(Line::from(spans));
  }
  lines
}

impl View for NoteView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      return ViewAction::Quit;
    }

    if self.paragraph.is_active() {
      if let KeyResult::Event(ParagraphEvent::Submitted(text)) = self.paragraph.handle_key(key) {
        self.append_paragraph(text);
      }
      return ViewAction::None;
    }

    if let Some(prompt) = self.prompt() {
      if let KeyResult::Event(action) = prompt.handle_key(key) {
        self.confirm(action);
        return ViewAction::None;
      }
    }

    match key.code {
      KeyCode::Char('q') => ViewAction::Quit,
      KeyCode::Esc => {
        self.confirm_delete = false;
        ViewAction::None
      }
      KeyCode::Char('a') if self.can_edit() => {
        self.confirm_delete = false;
        self.paragraph.handle_key(key);
        ViewAction::None
      }
      KeyCode::Char('d') if self.can_edit() => {
        self.confirm_delete = true;
        ViewAction::None
      }
      KeyCode::Char('r') => {
        self.vm.refresh();
        ViewAction::None
      }
      KeyCode::Down | KeyCode::Char('j') => {
        self.move_selection(1);
        ViewAction::None
      }
      KeyCode::Up | KeyCode::Char('k') => {
        self.move_selection(-1);
        ViewAction::None
      }
      KeyCode::Char('o') => {
        self.open_selected();
        ViewAction::None
      }
      KeyCode::Char('l') => {
        self.follow_link();
        ViewAction::None
      }
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    if area.width >= PANEL_WIDTH * 2 {
      let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(PANEL_WIDTH), Constraint::Min(1)])
        .split(area);
      self.render_panel(frame, chunks[0]);
      self.render_note(frame, chunks[1]);
      self.paragraph.render_overlay(frame, chunks[1]);
    } else {
      self.render_note(frame, area);
      self.paragraph.render_overlay(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    truncate(self.vm.note_id().as_str(), 24)
  }

  fn project(&self) -> Option<&str> {
    Some(self.vm.project().id.as_str())
  }

  fn tick(&mut self) {
    self.vm.tick();
  }

  fn status(&self) -> StatusLine {
    if self.vm.is_mutating() {
      StatusLine::Busy("Saving...".to_string())
    } else if let Some(e) = self.vm.mutation_error() {
      StatusLine::Error(e.to_string())
    } else if self.vm.loading() {
      StatusLine::Busy("Loading...".to_string())
    } else {
      StatusLine::Idle
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    let mut shortcuts = vec![
      ShortcutInfo::new("r", "refresh").with_priority(30),
      ShortcutInfo::new("j/k o", "open").with_priority(40),
      ShortcutInfo::new("q", "quit").with_priority(90),
    ];
    if self.vm.note().is_some() {
      shortcuts.push(ShortcutInfo::new("a", "append").with_priority(10));
      shortcuts.push(ShortcutInfo::new("d", "delete").with_priority(20));
      shortcuts.push(ShortcutInfo::new("l", "follow link").with_priority(50));
    }
    shortcuts
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::mock::{note, MockNoteStore};
  use ratatui::backend::TestBackend;
  use std::sync::Arc;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn view(notes: Vec<Note>, id: &str) -> (NoteView, Arc<MockNoteStore>) {
    let store = Arc::new(MockNoteStore::with_notes(notes));
    let client = CachedNoteClient::with_store(store.clone());
    (NoteView::new(client, Project::new("P1"), NoteId::new(id)), store)
  }

  async fn settle(view: &mut NoteView) {
    for _ in 0..100 {
      view.tick();
      if !view.vm.loading() && !view.vm.project_notes_loading() && !view.vm.is_mutating() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("view did not settle");
  }

  fn rendered(view: &mut NoteView) -> String {
    let mut terminal = Terminal::new(TestBackend::new(60, 10)).unwrap();
    terminal.draw(|frame| view.render(frame, frame.area())).unwrap();
    let buffer = terminal.backend().buffer();
    buffer.content().iter().map(|cell| cell.symbol()).collect()
  }

  #[tokio::test]
  async fn test_enter_creates_absent_note() {
    let (mut view, _) = view(vec![], "N1");
    settle(&mut view).await;
    assert!(rendered(&mut view).contains("Create note"));

    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    assert_eq!(view.vm.note().map(|n| n.id.as_str()), Some("N1"));
    assert!(!rendered(&mut view).contains("Create note"));
  }

  #[tokio::test]
  async fn test_delete_needs_confirmation() {
    let (mut view, _) = view(vec![note("N1", "note=P1", "body")], "N1");
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('d')));
    assert!(rendered(&mut view).contains("Delete note?"));
    view.handle_key(key(KeyCode::Esc));
    assert!(!rendered(&mut view).contains("Delete note?"));

    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;
    assert!(view.vm.note().is_none());
  }

  #[tokio::test]
  async fn test_append_paragraph_updates_note() {
    let (mut view, _) = view(vec![note("N1", "note=P1", "first")], "N1");
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('a')));
    for c in "second".chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;

    let texts: Vec<String> = view
      .vm
      .note()
      .map(|n| n.blocks.iter().map(|b| b.plain_text()).collect())
      .unwrap_or_default();
    assert_eq!(texts, vec!["first", "second"]);
    assert!(rendered(&mut view).contains("second"));
  }

  #[tokio::test]
  async fn test_q_quits_but_not_while_typing() {
    let (mut view, _) = view(vec![note("N1", "note=P1", "x")], "N1");
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('a')));
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::None);
    view.handle_key(key(KeyCode::Esc));
    assert_eq!(view.handle_key(key(KeyCode::Char('q'))), ViewAction::Quit);
  }

  #[tokio::test]
  async fn test_read_error_is_rendered() {
    let store = Arc::new(MockNoteStore::new());
    store.set_failing(true);
    let client = CachedNoteClient::with_store(store);
    let mut view = NoteView::new(client, Project::new("P1"), NoteId::new("N1"));
    settle(&mut view).await;

    let screen = rendered(&mut view);
    assert!(screen.contains("store unavailable"));
    assert!(!screen.contains("Create note"));
  }

  fn panel_ids(view: &NoteView) -> Vec<String> {
    view
      .vm
      .project_notes()
      .map(|notes| notes.iter().map(|n| n.id.to_string()).collect())
      .unwrap_or_default()
  }

  fn linked(id: &str, text: &str, target: &str) -> Note {
    let mut n = note(id, "note=P1", text);
    n.blocks[0].children[0].link_note_id = Some(NoteId::new(target));
    n
  }

  #[tokio::test]
  async fn test_panel_follows_create_and_delete_from_cache() {
    let (mut view, store) = view(vec![note("A", "note=P1", "alpha")], "B");
    settle(&mut view).await;
    assert_eq!(panel_ids(&view), vec!["A"]);
    assert!(rendered(&mut view).contains("alpha"));
    let reads = store.read_count();

    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;
    assert_eq!(panel_ids(&view), vec!["A", "B"]);

    view.handle_key(key(KeyCode::Char('a')));
    for c in "beta".chars() {
      view.handle_key(key(KeyCode::Char(c)));
    }
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;
    assert!(rendered(&mut view).contains("beta"));

    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Enter));
    settle(&mut view).await;
    assert_eq!(panel_ids(&view), vec!["A"]);
    assert!(!rendered(&mut view).contains("beta"));

    assert_eq!(store.read_count(), reads);
  }

  #[tokio::test]
  async fn test_open_selected_note_from_panel() {
    let (mut view, _) = view(
      vec![note("A", "note=P1", "alpha"), note("B", "note=P1", "beta")],
      "A",
    );
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('j')));
    view.handle_key(key(KeyCode::Char('o')));
    settle(&mut view).await;

    assert_eq!(view.vm.note_id().as_str(), "B");
    assert_eq!(view.vm.note().map(|n| n.blocks[0].plain_text()), Some("beta".to_string()));
  }

  #[tokio::test]
  async fn test_follow_link_opens_target() {
    let (mut view, _) = view(
      vec![linked("A", "see beta", "B"), note("B", "note=P1", "beta")],
      "A",
    );
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('l')));
    settle(&mut view).await;
    assert_eq!(view.vm.note_id().as_str(), "B");

    // B has no links; nothing happens
    view.handle_key(key(KeyCode::Char('l')));
    assert_eq!(view.vm.note_id().as_str(), "B");
  }

  #[tokio::test]
  async fn test_dangling_link_opens_create_prompt() {
    let (mut view, _) = view(vec![linked("A", "gone", "Z")], "A");
    settle(&mut view).await;

    view.handle_key(key(KeyCode::Char('l')));
    settle(&mut view).await;
    assert!(view.vm.note().is_none());
    assert!(rendered(&mut view).contains("Create note"));
  }
}
