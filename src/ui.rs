use ratatui::{
  Frame,
  layout::{Alignment, Constraint, Flex, Layout, Rect},
  style::{Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, BorderType, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::{App, AppMode};
use crate::input::TextField;
use crate::theme::Theme;
use crate::video::Video;

// --- Helpers ---

/// Compute the display width of the first `n` chars (accounting for double-width CJK).
pub fn display_width(s: &str, n: usize) -> usize {
  use unicode_width::UnicodeWidthChar;
  s.chars().take(n).map(|c| c.width().unwrap_or(0)).sum()
}

/// Truncate a string to `max_width` characters, appending "…" if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
  if s.chars().count() <= max_width {
    s.to_string()
  } else {
    let truncated: String = s.chars().take(max_width.saturating_sub(1)).collect();
    format!("{}…", truncated)
  }
}

fn rounded_block(theme: &Theme) -> Block<'static> {
  Block::bordered().border_type(BorderType::Rounded).border_style(Style::default().fg(theme.border))
}

fn hashtags(tags: &[String]) -> String {
  tags.iter().map(|t| format!("#{}", t)).collect::<Vec<_>>().join(" ")
}

// --- UI Rendering ---

pub fn ui(frame: &mut Frame, app: &mut App) {
  let theme = app.theme();

  frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), frame.area());

  let [header_area, main_area, status_area, input_area, footer_area] = Layout::vertical([
    Constraint::Length(1),
    Constraint::Min(3),
    Constraint::Length(1),
    Constraint::Length(3),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  render_header(frame, app, header_area);
  render_main(frame, app, main_area);
  render_status(frame, app, status_area);
  render_input(frame, app, input_area);
  render_footer(frame, app, footer_area);

  if app.mode == AppMode::ConfirmDelete {
    render_confirm_delete(frame, app, main_area);
  }
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let count = app.catalog.len();
  let noun = if count == 1 { "video" } else { "videos" };
  let left = Line::from(vec![
    Span::styled(" ▶ reelstack ", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)),
    Span::styled(format!("{} {}", count, noun), Style::default().fg(theme.muted)),
  ]);
  frame.render_widget(left, area);

  let ai = if app.ai_enabled { "AI tags" } else { "basic tags" };
  let right_text = format!("{}  v{} ", ai, env!("CARGO_PKG_VERSION"));
  let right_w = right_text.chars().count() as u16;
  let right = Line::from(Span::styled(&right_text, Style::default().fg(theme.muted)));
  let right_area = Rect { x: area.x + area.width.saturating_sub(right_w), width: right_w.min(area.width), ..area };
  frame.render_widget(right, right_area);
}

fn render_main(frame: &mut Frame, app: &mut App, area: Rect) {
  match app.mode {
    AppMode::Welcome => render_welcome(frame, app, area),
    _ if app.catalog.is_empty() => render_empty(frame, app.theme(), area),
    _ if app.visible.is_empty() => render_no_matches(frame, app, area),
    _ => {
      let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(58), Constraint::Percentage(42)]).areas(area);
      render_list(frame, app, list_area);
      render_detail(frame, app.theme(), app.selected_video(), detail_area);
    }
  }
}

fn render_welcome(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let count = app.catalog.len();
  let summary = match count {
    0 => "Your catalog is empty.".to_string(),
    1 => "1 video saved.".to_string(),
    n => format!("{} videos saved.", n),
  };
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("▶  Welcome to ReelStack", Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Save links from YouTube, TikTok, Instagram and the web.", Style::default().fg(theme.fg))),
    Line::from(Span::styled("Titles, thumbnails and tags are filled in for you.", Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(Span::styled(summary, Style::default().fg(theme.fg))),
    Line::from(Span::styled(app.catalog.path().display().to_string(), Style::default().fg(theme.muted))),
    Line::from(""),
    Line::from(Span::styled("Press Enter to open your catalog.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme));
  frame.render_widget(paragraph, area);
}

fn render_empty(frame: &mut Frame, theme: &Theme, area: Rect) {
  let text = vec![
    Line::from(""),
    Line::from(Span::styled("No videos yet", Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    Line::from(Span::styled("Paste a link below to save your first video.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme));
  frame.render_widget(paragraph, area);
}

fn render_no_matches(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let text = vec![
    Line::from(""),
    Line::from(Span::styled(
      format!("No videos match “{}”", app.search.text.trim()),
      Style::default().fg(theme.fg).add_modifier(Modifier::BOLD),
    )),
    Line::from(""),
    Line::from(Span::styled("Try another search, or press Esc in the search box to clear it.", Style::default().fg(theme.muted))),
  ];
  let paragraph = Paragraph::new(text).alignment(Alignment::Center).block(rounded_block(theme));
  frame.render_widget(paragraph, area);
}

fn render_list(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();

  // Inner width: area minus 2 borders minus 2 chars for highlight symbol ("▶ ")
  let inner_w = area.width.saturating_sub(4) as usize;

  let items: Vec<ListItem> = app
    .visible
    .iter()
    .enumerate()
    .map(|(i, video)| {
      let is_selected = Some(i) == app.list_state.selected();
      let fg = if is_selected { theme.highlight_fg } else { theme.fg };
      let bg = if is_selected {
        theme.highlight_bg
      } else if i % 2 == 1 {
        theme.stripe_bg
      } else {
        theme.bg
      };

      let right = format!("{}  {}", video.platform, video.saved_at);
      let right_w = right.chars().count();
      let title_max = inner_w.saturating_sub(right_w + 2);
      let title = truncate_str(&video.title, title_max);
      let gap = inner_w.saturating_sub(title.chars().count() + right_w);

      let line = Line::from(vec![
        Span::styled(title, Style::default().fg(fg)),
        Span::raw(" ".repeat(gap)),
        Span::styled(video.platform.clone(), Style::default().fg(theme.accent)),
        Span::raw("  "),
        Span::styled(video.saved_at.clone(), Style::default().fg(theme.muted)),
      ]);
      ListItem::new(line).bg(bg)
    })
    .collect();

  let title = if app.search.text.trim().is_empty() {
    format!(" Videos · {} ", app.sort.label())
  } else {
    format!(" Videos · {} of {} · {} ", app.visible.len(), app.catalog.len(), app.sort.label())
  };

  let list = List::new(items)
    .block(rounded_block(theme).title(title).title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD)))
    .highlight_symbol("▶ ")
    .highlight_style(Style::default().fg(theme.highlight_fg).bg(theme.highlight_bg).add_modifier(Modifier::BOLD));

  frame.render_stateful_widget(list, area, &mut app.list_state);
}

fn render_detail(frame: &mut Frame, theme: &Theme, video: Option<&Video>, area: Rect) {
  let block = rounded_block(theme)
    .title(" Details ")
    .title_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
    .padding(Padding::horizontal(1));

  let Some(video) = video else {
    frame.render_widget(block, area);
    return;
  };

  let inner_w = area.width.saturating_sub(4) as usize;
  let field = |label: &'static str, value: &str| {
    let value_w = inner_w.saturating_sub(label.len());
    Line::from(vec![
      Span::styled(label, Style::default().fg(theme.muted)),
      Span::styled(truncate_str(value, value_w), Style::default().fg(theme.fg)),
    ])
  };

  let mut lines = vec![
    Line::from(Span::styled(video.title.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::BOLD))),
    Line::from(""),
    field("Platform  ", &video.platform),
  ];
  if let Some(author) = &video.author {
    lines.push(field("Author    ", author));
  }
  lines.push(field("Saved     ", &video.saved_at));
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(
    truncate_str(&video.url, inner_w),
    Style::default().fg(theme.accent).add_modifier(Modifier::UNDERLINED),
  )));
  lines.push(Line::from(Span::styled(truncate_str(&video.thumbnail, inner_w), Style::default().fg(theme.muted))));
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(hashtags(&video.tags), Style::default().fg(theme.status))));
  if let Some(notes) = &video.notes {
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
      Span::styled("Notes  ", Style::default().fg(theme.muted)),
      Span::styled(notes.clone(), Style::default().fg(theme.fg).add_modifier(Modifier::ITALIC)),
    ]));
  }
  lines.push(Line::from(""));
  lines.push(Line::from(Span::styled(video.description.clone(), Style::default().fg(theme.fg))));

  let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
  frame.render_widget(paragraph, area);
}

fn render_status(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let (text, style) = if let Some(msg) = &app.status_message {
    (format!(" ⏳ {}", msg), Style::default().fg(theme.status))
  } else if let Some(err) = &app.last_error {
    (format!(" ⚠  {}", err), Style::default().fg(theme.error))
  } else if let Some(info) = &app.info_message {
    (format!(" ℹ  {}", info), Style::default().fg(theme.status))
  } else {
    (" Ready".to_string(), Style::default().fg(theme.muted))
  };
  frame.render_widget(Paragraph::new(text).style(style), area);
}

fn render_input(frame: &mut Frame, app: &mut App, area: Rect) {
  let theme = app.theme();
  match app.mode {
    AppMode::Url => render_field(frame, theme, area, " Video link ", &mut app.url_input, true),
    AppMode::Notes => {
      let title = format!(" Notes (optional) · {} ", truncate_str(app.url_input.text.trim(), 40));
      render_field(frame, theme, area, &title, &mut app.notes_input, true)
    }
    AppMode::Search => render_field(frame, theme, area, " Search ", &mut app.search, true),
    AppMode::Browse | AppMode::ConfirmDelete => render_field(frame, theme, area, " Search ", &mut app.search, false),
    AppMode::Welcome => {
      let hint = Paragraph::new(Span::styled("Press Enter to begin", Style::default().fg(theme.muted)))
        .block(rounded_block(theme).padding(Padding::horizontal(1)));
      frame.render_widget(hint, area);
    }
  }
}

/// Render a single-line text field with horizontal scrolling, placing the
/// terminal cursor inside it when focused.
fn render_field(frame: &mut Frame, theme: &Theme, area: Rect, title: &str, field: &mut TextField, focused: bool) {
  let border_color = if focused { theme.accent } else { theme.border };
  let block = Block::bordered()
    .title(title.to_string())
    .title_style(Style::default().fg(border_color))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(border_color))
    .padding(Padding::horizontal(1));

  let inner_w = area.width.saturating_sub(4) as usize;
  let cursor_col = display_width(&field.text, field.cursor);

  if cursor_col < field.scroll {
    field.scroll = cursor_col;
  } else if cursor_col >= field.scroll + inner_w {
    field.scroll = cursor_col.saturating_sub(inner_w) + 1;
  }

  let scroll = field.scroll;
  let visible: String = field
    .text
    .chars()
    .scan(0usize, |col, c| {
      let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
      let start = *col;
      *col += w;
      Some((start, *col, c))
    })
    .skip_while(|(_, end, _)| *end <= scroll)
    .take_while(|(start, _, _)| *start < scroll + inner_w)
    .map(|(_, _, c)| c)
    .collect();

  let paragraph = Paragraph::new(visible).style(Style::default().fg(theme.fg)).block(block);
  frame.render_widget(paragraph, area);

  if focused {
    let cursor_x = area.x + 2 + (cursor_col - scroll) as u16;
    frame.set_cursor_position((cursor_x, area.y + 1));
  }
}

fn render_confirm_delete(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let title = app.pending_delete_video().map_or_else(|| "this video".to_string(), |v| format!("“{}”", v.title));

  let [popup] = Layout::horizontal([Constraint::Percentage(60)]).flex(Flex::Center).areas(area);
  let [popup] = Layout::vertical([Constraint::Length(5)]).flex(Flex::Center).areas(popup);
  let inner_w = popup.width.saturating_sub(4) as usize;

  let text = vec![
    Line::from(Span::styled(truncate_str(&format!("Delete {}?", title), inner_w), Style::default().fg(theme.fg))),
    Line::from(""),
    Line::from(vec![
      Span::styled(" y ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" Delete  ", Style::default().fg(theme.muted)),
      Span::styled(" n ", Style::default().fg(theme.key_fg).bg(theme.key_bg)),
      Span::styled(" Keep", Style::default().fg(theme.muted)),
    ]),
  ];
  let block = Block::bordered()
    .title(" Confirm ")
    .title_style(Style::default().fg(theme.error).add_modifier(Modifier::BOLD))
    .border_type(BorderType::Rounded)
    .border_style(Style::default().fg(theme.error))
    .padding(Padding::horizontal(1));

  frame.render_widget(Clear, popup);
  frame.render_widget(Paragraph::new(text).style(Style::default().bg(theme.bg)).block(block), popup);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
  let theme = app.theme();
  let keys: Vec<(&str, &str)> = match app.mode {
    AppMode::Welcome => vec![("Enter", "Open"), ("^t", "Theme"), ("q", "Quit")],
    AppMode::Browse => {
      let mut k = vec![("a", "Add"), ("/", "Search"), ("s", "Sort")];
      if app.selected_video().is_some() {
        k.push(("Enter", "Open"));
        k.push(("d", "Delete"));
      }
      k.push(("^t", "Theme"));
      k.push(("Esc", "Home"));
      k
    }
    AppMode::Url => vec![("Enter", "Next"), ("^t", "Theme"), ("Esc", "Cancel")],
    AppMode::Notes => {
      if app.is_saving() {
        vec![("Esc", "Back")]
      } else {
        vec![("Enter", "Save"), ("Esc", "Back")]
      }
    }
    AppMode::Search => vec![("Enter", "Done"), ("↑/↓", "Navigate"), ("Esc", "Clear")],
    AppMode::ConfirmDelete => vec![("y", "Delete"), ("n", "Keep")],
  };

  let spans: Vec<Span> = keys
    .iter()
    .enumerate()
    .flat_map(|(i, (key, action))| {
      let mut s = vec![
        Span::styled(format!(" {} ", key), Style::default().fg(theme.key_fg).bg(theme.key_bg)),
        Span::styled(format!(" {} ", action), Style::default().fg(theme.muted)),
      ];
      if i < keys.len() - 1 {
        s.push(Span::raw("  "));
      }
      s
    })
    .collect();

  frame.render_widget(Line::from(spans), area);

  let theme_label = format!("{} ", theme.name);
  let right = Line::from(Span::styled(&theme_label, Style::default().fg(theme.muted)));
  let right_area =
    Rect { x: area.x + area.width.saturating_sub(theme_label.len() as u16), width: theme_label.len() as u16, ..area };
  frame.render_widget(right, right_area);
}
