//! Application constants loaded from `constants.ron` at compile time.
//!
//! The RON file is embedded via `include_str!`, so there is no runtime file I/O.
//! Parsed once on first access via `LazyLock`.

use serde::Deserialize;
use std::sync::LazyLock;

/// All tuneable application constants.
#[derive(Debug, Deserialize)]
pub struct Constants {
  // Remote metadata providers
  pub youtube_oembed_url: String,
  pub noembed_url: String,
  /// Template with an `{id}` placeholder for the YouTube video id.
  pub youtube_thumbnail_url: String,
  pub placeholder_thumbnail_url: String,
  pub request_timeout_secs: u64,

  // Generative tagging
  pub gemini_base_url: String,
  pub gemini_model: String,
  pub gemini_api_key_env: String,
  pub ai_timeout_secs: u64,
  pub max_tags: usize,
  /// Tags must be strictly shorter than this many characters.
  pub max_tag_chars: usize,

  // Storage
  pub app_name: String,
  pub catalog_file: String,
  pub saved_at_format: String,

  // UI
  pub error_dismiss_secs: u64,
}

static CONSTANTS: LazyLock<Constants> = LazyLock::new(|| {
  // Safety: the RON file is embedded at compile time; if it's malformed this is a build-time error.
  ron::from_str(include_str!("../constants.ron")).expect("constants.ron must be valid RON (embedded at compile time)")
});

/// Returns a reference to the parsed application constants.
pub fn constants() -> &'static Constants {
  &CONSTANTS
}
