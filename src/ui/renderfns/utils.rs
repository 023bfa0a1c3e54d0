use crate::notes::types::InlineSpan;
use ratatui::prelude::*;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Terminal style for a text run
pub fn span_style(span: &InlineSpan) -> Style {
  let mut style = Style::default();
  if span.bold {
    style = style.add_modifier(Modifier::BOLD);
  }
  if span.italic {
    style = style.add_modifier(Modifier::ITALIC);
  }
  if span.underline {
    style = style.add_modifier(Modifier::UNDERLINED);
  }
  if span.strikethrough {
    style = style.add_modifier(Modifier::CROSSED_OUT);
  }
  if span.link_note_id.is_some() {
    style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
  }
  style
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::notes::types::NoteId;

  #[test]
  fn test_truncate_short_string() {
    assert_eq!(truncate("hello", 10), "hello");
    assert_eq!(truncate("hello", 5), "hello");
  }

  #[test]
  fn test_truncate_long_string() {
    assert_eq!(truncate("hello world", 8), "hello...");
  }

  #[test]
  fn test_truncate_multibyte() {
    assert_eq!(truncate("ééééééé", 5), "éé...");
  }

  #[test]
  fn test_span_style_flags() {
    let span = InlineSpan {
      bold: true,
      strikethrough: true,
      ..InlineSpan::text("x")
    };
    let style = span_style(&span);
    assert!(style.add_modifier.contains(Modifier::BOLD));
    assert!(style.add_modifier.contains(Modifier::CROSSED_OUT));
    assert!(!style.add_modifier.contains(Modifier::ITALIC));
  }

  #[test]
  fn test_link_is_marked() {
    let span = InlineSpan {
      link_note_id: Some(NoteId::new("other")),
      ..InlineSpan::text("see also")
    };
    assert_eq!(span_style(&span).fg, Some(Color::Blue));
    assert_eq!(span_style(&InlineSpan::text("plain")), Style::default());
  }
}
