use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Status shown on the right side of the footer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
  Idle,
  Busy(String),
  Error(String),
}

/// Draw the footer bar with view breadcrumb and status
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: &StatusLine) {
  let mut spans = vec![Span::raw(" ")];

  for (i, part) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(Span::styled(" > ", Style::default().fg(Color::DarkGray)));
    }

    let style = if i == breadcrumb.len() - 1 {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::White)
    };

    spans.push(Span::styled(part.clone(), style));
  }

  match status {
    StatusLine::Idle => {}
    StatusLine::Busy(msg) => {
      spans.push(Span::raw("   "));
      spans.push(Span::styled(msg.clone(), Style::default().fg(Color::DarkGray)));
    }
    StatusLine::Error(msg) => {
      spans.push(Span::raw("   "));
      spans.push(Span::styled(msg.clone(), Style::default().fg(Color::Red)));
    }
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}
