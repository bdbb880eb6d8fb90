//! The persisted collection of saved videos.
//!
//! The whole catalog lives in one JSON array file. Every mutation rewrites
//! the file in full; if the write fails the in-memory change is undone so
//! memory and disk never disagree.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::constants::constants;
use crate::tags::static_tags;
use crate::video::{Metadata, Video};

pub struct Catalog {
  path: PathBuf,
  videos: Vec<Video>,
  /// Set when the file on disk could not be replaced safely. Changes then stay in memory.
  memory_only: Option<String>,
}

/// Trimmed notes, or `None` when nothing but whitespace was entered.
pub fn normalize_notes(notes: Option<&str>) -> Option<String> {
  notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string)
}

impl Catalog {
  /// Load the catalog at `path`.
  ///
  /// A missing or blank file is an empty catalog. A file that does not parse as
  /// a list of videos is moved aside to `<name>.corrupt` and the catalog starts
  /// empty. If it cannot be moved, the catalog stays in memory only so the
  /// unreadable file is never overwritten. Only I/O errors other than
  /// "not found" are returned.
  pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
    let path = path.into();
    let content = match std::fs::read_to_string(&path) {
      Ok(content) => content,
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        info!(path = %path.display(), "catalog: no saved catalog yet");
        return Ok(Self::empty(path));
      }
      Err(e) => return Err(e).with_context(|| format!("Failed to read catalog {}", path.display())),
    };

    if content.trim().is_empty() {
      return Ok(Self::empty(path));
    }

    match serde_json::from_str::<Vec<Video>>(&content) {
      Ok(videos) => {
        info!(path = %path.display(), count = videos.len(), "catalog: loaded");
        Ok(Self { path, videos, memory_only: None })
      }
      Err(e) => {
        let aside = corrupt_path(&path);
        warn!(path = %path.display(), err = %e, aside = %aside.display(), "catalog: unreadable, starting empty");
        if let Err(e) = std::fs::rename(&path, &aside) {
          error!(path = %path.display(), err = %e, "catalog: could not move unreadable file aside");
          let reason =
            format!("Catalog {} is unreadable and could not be moved aside; changes will not be saved", path.display());
          return Ok(Self { path, videos: Vec::new(), memory_only: Some(reason) });
        }
        Ok(Self::empty(path))
      }
    }
  }

  fn empty(path: PathBuf) -> Self {
    Self { path, videos: Vec::new(), memory_only: None }
  }

  /// Why changes are not being written to disk, if they are not.
  pub fn memory_only(&self) -> Option<&str> {
    self.memory_only.as_deref()
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// All saved videos in storage order.
  pub fn snapshot(&self) -> &[Video] {
    &self.videos
  }

  pub fn len(&self) -> usize {
    self.videos.len()
  }

  pub fn is_empty(&self) -> bool {
    self.videos.is_empty()
  }

  /// Create a video from enrichment results, append it and persist.
  pub fn add(&mut self, url: &str, metadata: Metadata, tags: Vec<String>, notes: Option<&str>) -> Result<Video> {
    self.add_at(url, metadata, tags, notes, Local::now())
  }

  fn add_at(
    &mut self,
    url: &str,
    metadata: Metadata,
    tags: Vec<String>,
    notes: Option<&str>,
    now: DateTime<Local>,
  ) -> Result<Video> {
    let url = url.trim();
    if url.is_empty() {
      return Err(anyhow!("Cannot save a video without a URL"));
    }
    let tags = if tags.is_empty() { static_tags(&metadata.platform) } else { tags };

    let video = Video {
      id: self.next_id(now.timestamp_millis()),
      url: url.to_string(),
      title: metadata.title,
      description: metadata.description,
      thumbnail: metadata.thumbnail,
      platform: metadata.platform,
      tags,
      author: metadata.author,
      saved_at: now.format(&constants().saved_at_format).to_string(),
      notes: normalize_notes(notes),
    };

    self.videos.push(video.clone());
    if let Err(e) = self.save() {
      self.videos.pop();
      return Err(e);
    }
    info!(id = video.id, url = %video.url, "catalog: added");
    Ok(video)
  }

  /// Remove the video with `id` and persist. Returns `false` (without touching
  /// the file) when no such video exists.
  pub fn remove(&mut self, id: i64) -> Result<bool> {
    if !self.videos.iter().any(|v| v.id == id) {
      return Ok(false);
    }
    let previous = self.videos.clone();
    self.videos.retain(|v| v.id != id);
    if let Err(e) = self.save() {
      self.videos = previous;
      return Err(e);
    }
    info!(id, "catalog: removed");
    Ok(true)
  }

  /// Clock-based id, bumped past the current maximum so ids stay unique and increasing.
  fn next_id(&self, now_ms: i64) -> i64 {
    match self.videos.iter().map(|v| v.id).max() {
      Some(max) if now_ms <= max => max + 1,
      _ => now_ms,
    }
  }

  fn save(&self) -> Result<()> {
    if self.memory_only.is_some() {
      warn!(path = %self.path.display(), "catalog: memory-only, skipping save");
      return Ok(());
    }
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("Failed to create catalog directory {}", parent.display()))?;
    }
    let json = serde_json::to_vec(&self.videos).context("Failed to serialize catalog")?;

    // Write to a temp file, then rename (atomic)
    let tmp_path = self.path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json).with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, &self.path).with_context(|| format!("Failed to replace {}", self.path.display()))?;
    Ok(())
  }
}

fn corrupt_path(path: &Path) -> PathBuf {
  let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  name.push(".corrupt");
  path.with_file_name(name)
}
