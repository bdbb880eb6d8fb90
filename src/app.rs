use ratatui::widgets::ListState;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::constants::constants;
use crate::enrich::{Enricher, Enrichment};
use crate::input::TextField;
use crate::query::{self, SortKey};
use crate::theme::THEMES;
use crate::video::Video;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
  /// Landing screen shown before the catalog is opened.
  Welcome,
  /// Navigating the catalog list.
  Browse,
  /// Typing the link in the add form.
  Url,
  /// Typing optional notes for the link being added.
  Notes,
  Search,
  /// Waiting for y/n on `pending_delete`.
  ConfirmDelete,
}

pub struct App {
  pub mode: AppMode,
  pub theme_index: usize,
  pub sort: SortKey,
  pub url_input: TextField,
  pub notes_input: TextField,
  pub search: TextField,
  pub catalog: Catalog,
  /// The current filtered and sorted view of `catalog`; rebuilt on every change.
  pub visible: Vec<Video>,
  pub list_state: ListState,
  pub pending_delete: Option<i64>,
  pub last_error: Option<String>,
  pub status_message: Option<String>,
  /// Shown with an info icon. Status and error messages take precedence.
  pub info_message: Option<String>,
  pub should_quit: bool,
  pub ai_enabled: bool,
  enricher: Enricher,
  /// In-flight add. While set, further submissions are refused.
  add_rx: Option<oneshot::Receiver<Enrichment>>,
  config: Config,
  config_path: Option<PathBuf>,
  error_time: Option<Instant>,
}

impl App {
  pub fn new(catalog: Catalog, enricher: Enricher, config: Config, config_path: Option<PathBuf>) -> Self {
    let theme_index =
      if let Some(ref name) = config.theme_name { THEMES.iter().position(|t| t.name == name.as_str()).unwrap_or(0) } else { 0 };
    let sort = config.sort_key.as_deref().map(SortKey::parse).unwrap_or_default();

    let mut app = Self {
      mode: AppMode::Welcome,
      theme_index,
      sort,
      url_input: TextField::default(),
      notes_input: TextField::default(),
      search: TextField::default(),
      catalog,
      visible: Vec::new(),
      list_state: ListState::default(),
      pending_delete: None,
      last_error: None,
      status_message: None,
      info_message: None,
      should_quit: false,
      ai_enabled: enricher.has_ai(),
      enricher,
      add_rx: None,
      config,
      config_path,
      error_time: None,
    };
    app.refresh_view();
    if let Some(reason) = app.catalog.memory_only().map(str::to_string) {
      app.set_error(reason);
    }
    app
  }

  pub fn theme(&self) -> &'static crate::theme::Theme {
    // Safety: theme_index is always bounded by modular arithmetic in next_theme()
    // and clamped to a valid position on initialization.
    &THEMES[self.theme_index]
  }

  /// Set an error message with auto-dismiss tracking.
  pub fn set_error(&mut self, msg: String) {
    self.last_error = Some(msg);
    self.error_time = Some(Instant::now());
  }

  /// Clear the current error message and its expiry timer.
  pub fn clear_error(&mut self) {
    self.last_error = None;
    self.error_time = None;
  }

  /// Clear stale error messages after `error_dismiss_secs`.
  pub fn expire_error(&mut self) {
    if let Some(t) = self.error_time
      && t.elapsed() >= Duration::from_secs(constants().error_dismiss_secs)
    {
      self.last_error = None;
      self.error_time = None;
    }
  }

  fn save_config(&mut self) {
    self.config.theme_name = Some(self.theme().name.to_string());
    self.config.sort_key = Some(self.sort.name().to_string());
    if let Some(ref path) = self.config_path {
      self.config.save_to(path);
    }
  }

  pub fn next_theme(&mut self) {
    self.theme_index = (self.theme_index + 1) % THEMES.len();
    self.save_config();
  }

  pub fn next_sort(&mut self) {
    self.sort = self.sort.next();
    self.refresh_view();
    self.save_config();
  }

  pub fn is_saving(&self) -> bool {
    self.add_rx.is_some()
  }

  pub fn open_catalog(&mut self) {
    self.mode = if self.catalog.is_empty() { AppMode::Url } else { AppMode::Browse };
  }

  pub fn close_catalog(&mut self) {
    self.mode = AppMode::Welcome;
  }

  /// Rebuild `visible` from the catalog, search text and sort key.
  /// Clamps the list selection to stay within the visible range.
  pub fn refresh_view(&mut self) {
    self.visible = query::view(self.catalog.snapshot(), &self.search.text, self.sort);
    if self.visible.is_empty() {
      self.list_state.select(None);
    } else {
      let sel = self.list_state.selected().unwrap_or(0);
      self.list_state.select(Some(sel.min(self.visible.len() - 1)));
    }
  }

  pub fn selected_video(&self) -> Option<&Video> {
    self.list_state.selected().and_then(|i| self.visible.get(i))
  }

  fn select_id(&mut self, id: i64) {
    if let Some(pos) = self.visible.iter().position(|v| v.id == id) {
      self.list_state.select(Some(pos));
    }
  }

  pub fn select_next(&mut self) {
    let count = self.visible.len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
      self.list_state.select(Some(i));
    }
  }

  pub fn select_previous(&mut self) {
    let count = self.visible.len();
    if count > 0 {
      let i = self.list_state.selected().map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
      self.list_state.select(Some(i));
    }
  }

  // --- Add flow ---

  /// Start enriching the URL in the add form. Only one add may be in flight;
  /// a second submission while saving is refused.
  pub fn submit_add(&mut self) {
    if self.is_saving() {
      self.set_error("Already saving…".to_string());
      return;
    }
    let url = self.url_input.text.trim().to_string();
    if url.is_empty() {
      self.set_error("Paste a video link first.".to_string());
      self.mode = AppMode::Url;
      return;
    }
    let notes = Some(self.notes_input.text.clone());

    info!(url = %url, "add triggered");
    self.clear_error();
    self.info_message = None;
    self.status_message = Some("Saving…".to_string());
    self.url_input.clear();
    self.notes_input.clear();
    self.mode = AppMode::Browse;

    let enricher = self.enricher.clone();
    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
      let _ = tx.send(enricher.enrich(url, notes).await);
    });
    self.add_rx = Some(rx);
  }

  /// Poll the in-flight add and commit it to the catalog once enrichment finishes.
  pub fn check_pending(&mut self) {
    let Some(mut rx) = self.add_rx.take() else { return };
    match rx.try_recv() {
      Ok(enrichment) => {
        self.status_message = None;
        let Enrichment { url, notes, metadata, tags } = enrichment;
        match self.catalog.add(&url, metadata, tags, notes.as_deref()) {
          Ok(video) => {
            self.info_message = Some(format!("Saved “{}”", video.title));
            self.refresh_view();
            self.select_id(video.id);
          }
          Err(e) => {
            error!(err = %format!("{:#}", e), "add failed");
            self.set_error(format!("Failed to save: {:#}", e));
          }
        }
      }
      Err(oneshot::error::TryRecvError::Empty) => {
        self.add_rx = Some(rx);
      }
      Err(oneshot::error::TryRecvError::Closed) => {
        self.status_message = None;
        error!("add task ended without a result");
        self.set_error("Save task failed.".to_string());
      }
    }
  }

  // --- Delete flow ---

  pub fn request_delete(&mut self) {
    if let Some(id) = self.selected_video().map(|v| v.id) {
      self.pending_delete = Some(id);
      self.mode = AppMode::ConfirmDelete;
    }
  }

  pub fn cancel_delete(&mut self) {
    self.pending_delete = None;
    self.mode = AppMode::Browse;
  }

  pub fn confirm_delete(&mut self) {
    self.mode = AppMode::Browse;
    let Some(id) = self.pending_delete.take() else { return };
    match self.catalog.remove(id) {
      Ok(true) => {
        self.info_message = Some("Video deleted.".to_string());
        self.refresh_view();
      }
      Ok(false) => warn!(id, "delete: video already gone"),
      Err(e) => {
        error!(id, err = %format!("{:#}", e), "delete failed");
        self.set_error(format!("Failed to delete: {:#}", e));
      }
    }
  }

  /// The video awaiting delete confirmation, if any.
  pub fn pending_delete_video(&self) -> Option<&Video> {
    let id = self.pending_delete?;
    self.catalog.snapshot().iter().find(|v| v.id == id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Endpoints;
  use crate::input::handle_key_event;
  use crate::test_support::{dead_endpoint, test_client};
  use crate::video::Metadata;
  use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
      handle_key_event(app, key(KeyCode::Char(c)));
    }
  }

  async fn offline_app(dir: &tempfile::TempDir) -> App {
    let dead = dead_endpoint().await;
    let endpoints = Endpoints {
      youtube_oembed: dead.clone(),
      noembed: dead.clone(),
      gemini_base: dead,
      ..Config::default().endpoints()
    };
    let enricher = Enricher::with_client(test_client(), &endpoints, None);
    let catalog = Catalog::load(dir.path().join("videos.json")).unwrap();
    App::new(catalog, enricher, Config::default(), None)
  }

  fn seed(app: &mut App, title: &str, platform: &str) -> i64 {
    let meta = Metadata {
      title: title.to_string(),
      description: title.to_string(),
      thumbnail: "https://example.com/t.jpg".to_string(),
      platform: platform.to_string(),
      author: None,
    };
    let id = app.catalog.add(&format!("https://example.com/{title}"), meta, vec!["video".to_string()], None).unwrap().id;
    app.refresh_view();
    id
  }

  async fn wait_for_add(app: &mut App) {
    for _ in 0..200 {
      app.check_pending();
      if !app.is_saving() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("add did not complete");
  }

  #[tokio::test]
  async fn starts_on_welcome_and_opens_add_form_when_empty() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    assert_eq!(app.mode, AppMode::Welcome);
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert_eq!(app.mode, AppMode::Url);
  }

  #[tokio::test]
  async fn add_flow_commits_to_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    app.mode = AppMode::Url;
    type_text(&mut app, "https://www.tiktok.com/@u/video/1");
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert_eq!(app.mode, AppMode::Notes);
    type_text(&mut app, "  funny one ");
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert!(app.is_saving());
    assert_eq!(app.mode, AppMode::Browse);

    wait_for_add(&mut app).await;
    assert_eq!(app.catalog.len(), 1);
    let video = app.selected_video().unwrap();
    assert_eq!(video.title, "TikTok Video");
    assert_eq!(video.tags, ["tiktok", "short-form", "viral"]);
    assert_eq!(video.notes.as_deref(), Some("funny one"));
    assert!(app.status_message.is_none());
  }

  #[tokio::test]
  async fn second_submit_while_saving_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    app.url_input.text = "https://example.com/a".to_string();
    app.submit_add();
    app.url_input.text = "https://example.com/b".to_string();
    app.submit_add();
    assert!(app.last_error.is_some());
    assert_eq!(app.url_input.text, "https://example.com/b");

    wait_for_add(&mut app).await;
    assert_eq!(app.catalog.len(), 1);
    assert_eq!(app.catalog.snapshot()[0].url, "https://example.com/a");
  }

  #[tokio::test]
  async fn empty_url_is_rejected_before_any_work() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    app.mode = AppMode::Url;
    handle_key_event(&mut app, key(KeyCode::Enter));
    assert_eq!(app.mode, AppMode::Url);
    assert!(app.last_error.is_some());
    app.submit_add();
    assert!(!app.is_saving());
  }

  #[tokio::test]
  async fn delete_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    let keep = seed(&mut app, "Keep", "Web");
    let target = seed(&mut app, "Target", "Web");
    app.mode = AppMode::Browse;
    app.select_id(target);

    handle_key_event(&mut app, key(KeyCode::Char('d')));
    assert_eq!(app.mode, AppMode::ConfirmDelete);
    assert_eq!(app.pending_delete_video().map(|v| v.title.as_str()), Some("Target"));
    handle_key_event(&mut app, key(KeyCode::Char('n')));
    assert_eq!(app.catalog.len(), 2);

    handle_key_event(&mut app, key(KeyCode::Char('d')));
    handle_key_event(&mut app, key(KeyCode::Char('y')));
    assert_eq!(app.mode, AppMode::Browse);
    let ids: Vec<i64> = app.catalog.snapshot().iter().map(|v| v.id).collect();
    assert_eq!(ids, [keep]);
    assert_eq!(Catalog::load(app.catalog.path()).unwrap().len(), 1);
  }

  #[tokio::test]
  async fn search_and_sort_drive_the_view() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = offline_app(&dir).await;
    seed(&mut app, "Banana", "YouTube");
    seed(&mut app, "apple", "TikTok");
    seed(&mut app, "Cherry", "Web");
    app.mode = AppMode::Browse;

    handle_key_event(&mut app, key(KeyCode::Char('/')));
    type_text(&mut app, "TikTok");
    assert_eq!(app.visible.len(), 1);
    assert_eq!(app.visible[0].platform, "TikTok");
    handle_key_event(&mut app, key(KeyCode::Esc));
    assert_eq!(app.visible.len(), 3);

    app.sort = SortKey::TitleDesc;
    handle_key_event(&mut app, key(KeyCode::Char('s')));
    assert_eq!(app.sort, SortKey::PlatformAsc);
    let platforms: Vec<&str> = app.visible.iter().map(|v| v.platform.as_str()).collect();
    assert_eq!(platforms, ["TikTok", "Web", "YouTube"]);
  }

  #[tokio::test]
  async fn unsaveable_catalog_is_reported_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("videos.json");
    std::fs::write(&path, "{not json").unwrap();
    let aside = dir.path().join("videos.json.corrupt");
    std::fs::create_dir(&aside).unwrap();
    std::fs::write(aside.join("keep"), "x").unwrap();

    let dead = dead_endpoint().await;
    let endpoints = Endpoints { youtube_oembed: dead.clone(), noembed: dead, ..Config::default().endpoints() };
    let enricher = Enricher::with_client(test_client(), &endpoints, None);
    let app = App::new(Catalog::load(&path).unwrap(), enricher, Config::default(), None);
    assert!(app.last_error.as_deref().is_some_and(|e| e.contains("will not be saved")));
  }

  #[tokio::test]
  async fn saved_preferences_restore_sort() {
    let dir = tempfile::tempdir().unwrap();
    let dead = dead_endpoint().await;
    let endpoints = Endpoints { youtube_oembed: dead.clone(), noembed: dead, ..Config::default().endpoints() };
    let enricher = Enricher::with_client(test_client(), &endpoints, None);
    let catalog = Catalog::load(dir.path().join("videos.json")).unwrap();
    let config = Config { sort_key: Some("title_asc".to_string()), theme_name: Some("Paper".to_string()), ..Config::default() };
    let prefs = dir.path().join("prefs.toml");
    let mut app = App::new(catalog, enricher, config, Some(prefs.clone()));
    assert_eq!(app.sort, SortKey::TitleAsc);
    assert_eq!(app.theme().name, "Paper");

    app.next_sort();
    assert_eq!(Config::load_from(&prefs).sort_key.as_deref(), Some("title_desc"));
  }
}
