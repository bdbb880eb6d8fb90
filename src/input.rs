use anyhow::{Context, Result};
use ratatui::crossterm::event::{self, KeyCode, KeyModifiers};

use crate::app::{App, AppMode};

// --- Helpers ---

/// Convert a char index to a byte offset within the string.
pub fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
  s.char_indices().nth(char_idx).map_or(s.len(), |(i, _)| i)
}

/// Single-line editable text with a char-indexed cursor and horizontal scroll.
#[derive(Debug, Default, Clone)]
pub struct TextField {
  pub text: String,
  pub cursor: usize,
  pub scroll: usize,
}

impl TextField {
  pub fn is_empty(&self) -> bool {
    self.text.trim().is_empty()
  }

  pub fn clear(&mut self) {
    self.text.clear();
    self.cursor = 0;
    self.scroll = 0;
  }

  /// Apply an editing key. Returns `true` when the text changed.
  pub fn edit(&mut self, code: KeyCode) -> bool {
    match code {
      KeyCode::Char(c) => {
        let byte_idx = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_idx, c);
        self.cursor += 1;
        true
      }
      KeyCode::Backspace => {
        if self.cursor > 0 {
          self.cursor -= 1;
          let byte_idx = char_to_byte_index(&self.text, self.cursor);
          self.text.remove(byte_idx);
          return true;
        }
        false
      }
      KeyCode::Delete => {
        if self.cursor < self.text.chars().count() {
          let byte_idx = char_to_byte_index(&self.text, self.cursor);
          self.text.remove(byte_idx);
          return true;
        }
        false
      }
      KeyCode::Left => {
        self.cursor = self.cursor.saturating_sub(1);
        false
      }
      KeyCode::Right => {
        if self.cursor < self.text.chars().count() {
          self.cursor += 1;
        }
        false
      }
      KeyCode::Home => {
        self.cursor = 0;
        false
      }
      KeyCode::End => {
        self.cursor = self.text.chars().count();
        false
      }
      _ => false,
    }
  }
}

/// Open a URL in the default browser without blocking the UI.
fn open_in_browser(url: &str) -> Result<()> {
  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(not(target_os = "macos"))]
  let cmd = "xdg-open";
  let mut child = std::process::Command::new(cmd)
    .arg(url)
    .stdin(std::process::Stdio::null())
    .stdout(std::process::Stdio::null())
    .stderr(std::process::Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to run {}", cmd))?;
  // Reap the child in a background thread to avoid zombie processes.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}

// --- Event Handling ---

pub fn handle_key_event(app: &mut App, key: event::KeyEvent) {
  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
    app.should_quit = true;
    return;
  }

  if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('t') {
    app.next_theme();
    return;
  }

  match app.mode {
    AppMode::Welcome => handle_welcome_key(app, key),
    AppMode::Browse => handle_browse_key(app, key),
    AppMode::Url => handle_url_key(app, key),
    AppMode::Notes => handle_notes_key(app, key),
    AppMode::Search => handle_search_key(app, key),
    AppMode::ConfirmDelete => handle_confirm_key(app, key),
  }
}

fn handle_welcome_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('o') => app.open_catalog(),
    KeyCode::Esc | KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

fn handle_browse_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Char('a') | KeyCode::Char('+') => {
      app.mode = AppMode::Url;
    }
    KeyCode::Char('/') => {
      app.mode = AppMode::Search;
    }
    KeyCode::Char('s') => {
      app.next_sort();
    }
    KeyCode::Char('d') | KeyCode::Delete => {
      app.request_delete();
    }
    KeyCode::Enter | KeyCode::Char('o') => {
      if let Some(url) = app.selected_video().map(|v| v.url.clone())
        && let Err(e) = open_in_browser(&url)
      {
        app.set_error(format!("Failed to open browser: {:#}", e));
      }
    }
    KeyCode::Down | KeyCode::Char('j') => app.select_next(),
    KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
    KeyCode::Esc => app.close_catalog(),
    KeyCode::Char('q') => app.should_quit = true,
    _ => {}
  }
}

fn handle_url_key(app: &mut App, key: event::KeyEvent) {
  app.clear_error();
  match key.code {
    KeyCode::Enter | KeyCode::Tab => {
      if app.url_input.is_empty() {
        app.set_error("Paste a video link first.".to_string());
      } else {
        app.mode = AppMode::Notes;
      }
    }
    KeyCode::Esc => {
      app.url_input.clear();
      app.notes_input.clear();
      app.mode = AppMode::Browse;
    }
    code => {
      app.url_input.edit(code);
    }
  }
}

fn handle_notes_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => app.submit_add(),
    KeyCode::Esc | KeyCode::BackTab => app.mode = AppMode::Url,
    code => {
      app.notes_input.edit(code);
    }
  }
}

fn handle_search_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Enter => {
      app.mode = AppMode::Browse;
    }
    KeyCode::Esc => {
      // Clear search and return to the list
      app.search.clear();
      app.refresh_view();
      app.mode = AppMode::Browse;
    }
    KeyCode::Down => app.select_next(),
    KeyCode::Up => app.select_previous(),
    code => {
      if app.search.edit(code) {
        app.refresh_view();
      }
    }
  }
}

fn handle_confirm_key(app: &mut App, key: event::KeyEvent) {
  match key.code {
    KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_delete(),
    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
    _ => {}
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  // --- char_to_byte_index ---

  #[test]
  fn char_to_byte_ascii() {
    assert_eq!(char_to_byte_index("hello", 0), 0);
    assert_eq!(char_to_byte_index("hello", 3), 3);
    assert_eq!(char_to_byte_index("hello", 5), 5); // past end
  }

  #[test]
  fn char_to_byte_multibyte() {
    let s = "aé日"; // a=1 byte, é=2 bytes, 日=3 bytes
    assert_eq!(char_to_byte_index(s, 0), 0);
    assert_eq!(char_to_byte_index(s, 1), 1);
    assert_eq!(char_to_byte_index(s, 2), 3);
    assert_eq!(char_to_byte_index(s, 3), 6);
  }

  // --- TextField ---

  #[test]
  fn text_field_insert_and_delete() {
    let mut field = TextField::default();
    for c in "héllo".chars() {
      assert!(field.edit(KeyCode::Char(c)));
    }
    assert_eq!(field.text, "héllo");
    field.edit(KeyCode::Home);
    field.edit(KeyCode::Right);
    assert!(field.edit(KeyCode::Delete));
    assert_eq!(field.text, "hllo");
    field.edit(KeyCode::End);
    assert!(field.edit(KeyCode::Backspace));
    assert_eq!(field.text, "hll");
    assert_eq!(field.cursor, 3);
  }

  #[test]
  fn text_field_edges_do_not_change_text() {
    let mut field = TextField::default();
    assert!(!field.edit(KeyCode::Backspace));
    assert!(!field.edit(KeyCode::Delete));
    field.edit(KeyCode::Left);
    assert_eq!(field.cursor, 0);
  }

  #[test]
  fn text_field_blank_counts_as_empty() {
    let mut field = TextField::default();
    field.edit(KeyCode::Char(' '));
    assert!(field.is_empty());
    field.clear();
    assert_eq!(field.cursor, 0);
  }
}
