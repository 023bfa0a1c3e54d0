pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let host = app.host().to_string();
  let view = app.view_mut();

  let project = view.project().unwrap_or("").to_string();
  renderfns::draw_header(frame, chunks[0], &host, &project, &view.shortcuts());

  view.render(frame, chunks[1]);

  let breadcrumb = vec!["Notes".to_string(), view.breadcrumb_label()];
  renderfns::draw_footer(frame, chunks[2], &breadcrumb, &view.status());
}
