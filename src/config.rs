use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::constants;

#[derive(Serialize, Deserialize, Default, Debug, Clone)]
pub struct Config {
  pub theme_name: Option<String>,
  pub sort_key: Option<String>,
  pub gemini_model: Option<String>,
  pub youtube_oembed_url: Option<String>,
  pub noembed_url: Option<String>,
  pub gemini_base_url: Option<String>,
}

/// Remote endpoints after applying preference overrides to the embedded defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
  pub youtube_oembed: String,
  pub noembed: String,
  pub gemini_base: String,
  pub gemini_model: String,
}

fn project_dirs() -> Option<ProjectDirs> {
  ProjectDirs::from("", "", &constants().app_name)
}

/// Directory holding the catalog file and logs.
pub fn data_dir() -> Option<PathBuf> {
  project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
}

/// Default location of the persisted catalog.
pub fn default_catalog_path() -> PathBuf {
  let file = &constants().catalog_file;
  match data_dir() {
    Some(dir) => dir.join(file),
    None => PathBuf::from(file),
  }
}

impl Config {
  /// Location of `prefs.toml` in the platform config directory.
  pub fn path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("prefs.toml"))
  }

  pub fn load() -> Self {
    Self::path().map(|path| Self::load_from(&path)).unwrap_or_default()
  }

  pub fn load_from(path: &Path) -> Self {
    if let Ok(content) = std::fs::read_to_string(path)
      && let Some(config) = Self::from_toml(&content)
    {
      return config;
    }
    Self::default()
  }

  fn from_toml(content: &str) -> Option<Self> {
    toml::from_str(content).ok()
  }

  pub fn save_to(&self, path: &Path) {
    if let Some(config_dir) = path.parent()
      && std::fs::create_dir_all(config_dir).is_ok()
      && let Ok(content) = toml::to_string(self)
    {
      let _ = std::fs::write(path, content);
    }
  }

  pub fn endpoints(&self) -> Endpoints {
    let c = constants();
    let pick = |value: &Option<String>, default: &str| -> String {
      value.as_deref().map(str::trim).filter(|s| !s.is_empty()).unwrap_or(default).to_string()
    };
    Endpoints {
      youtube_oembed: pick(&self.youtube_oembed_url, &c.youtube_oembed_url),
      noembed: pick(&self.noembed_url, &c.noembed_url),
      gemini_base: pick(&self.gemini_base_url, &c.gemini_base_url),
      gemini_model: pick(&self.gemini_model, &c.gemini_model),
    }
  }
}

/// Read the generative-model credential from the process environment.
pub fn gemini_api_key() -> Option<String> {
  api_key_from(|key| std::env::var(key).ok())
}

fn api_key_from(env_lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
  env_lookup(&constants().gemini_api_key_env).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn endpoints_default_to_constants() {
    let endpoints = Config::default().endpoints();
    assert_eq!(endpoints.youtube_oembed, constants().youtube_oembed_url);
    assert_eq!(endpoints.noembed, constants().noembed_url);
    assert_eq!(endpoints.gemini_model, constants().gemini_model);
  }

  #[test]
  fn endpoints_prefer_overrides() {
    let config = Config {
      noembed_url: Some("http://127.0.0.1:9/embed".to_string()),
      gemini_model: Some("  ".to_string()),
      ..Config::default()
    };
    let endpoints = config.endpoints();
    assert_eq!(endpoints.noembed, "http://127.0.0.1:9/embed");
    // Blank overrides fall back to the default.
    assert_eq!(endpoints.gemini_model, constants().gemini_model);
  }

  #[test]
  fn from_toml_reads_known_fields() {
    let config = Config::from_toml("theme_name = \"Dusk\"\nsort_key = \"title_asc\"\n").unwrap();
    assert_eq!(config.theme_name.as_deref(), Some("Dusk"));
    assert_eq!(config.sort_key.as_deref(), Some("title_asc"));
    assert!(config.noembed_url.is_none());
  }

  #[test]
  fn save_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("prefs.toml");
    let config = Config { theme_name: Some("Paper".to_string()), sort_key: Some("date_asc".to_string()), ..Config::default() };
    config.save_to(&path);
    let loaded = Config::load_from(&path);
    assert_eq!(loaded.theme_name.as_deref(), Some("Paper"));
    assert_eq!(loaded.sort_key.as_deref(), Some("date_asc"));
  }

  #[test]
  fn load_from_missing_file_is_default() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load_from(&dir.path().join("missing.toml")).theme_name.is_none());
  }

  #[test]
  fn from_toml_rejects_garbage() {
    assert!(Config::from_toml("theme_name = [").is_none());
  }

  #[test]
  fn api_key_ignores_blank_values() {
    assert_eq!(api_key_from(|_| Some("  ".to_string())), None);
    assert_eq!(api_key_from(|_| None), None);
    assert_eq!(api_key_from(|_| Some(" abc ".to_string())).as_deref(), Some("abc"));
  }
}
