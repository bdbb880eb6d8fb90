//! Filtering and ordering of the catalog for display.

use std::cmp::Ordering;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::video::Video;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
  #[default]
  DateDesc,
  DateAsc,
  TitleAsc,
  TitleDesc,
  PlatformAsc,
}

impl SortKey {
  pub const ALL: [SortKey; 5] =
    [SortKey::DateDesc, SortKey::DateAsc, SortKey::TitleAsc, SortKey::TitleDesc, SortKey::PlatformAsc];

  /// Parse a sort key name. Names match exactly; anything else falls back to newest-first.
  pub fn parse(s: &str) -> Self {
    match s {
      "date_asc" => SortKey::DateAsc,
      "title_asc" => SortKey::TitleAsc,
      "title_desc" => SortKey::TitleDesc,
      "platform_asc" => SortKey::PlatformAsc,
      _ => SortKey::DateDesc,
    }
  }

  pub fn name(self) -> &'static str {
    match self {
      SortKey::DateDesc => "date_desc",
      SortKey::DateAsc => "date_asc",
      SortKey::TitleAsc => "title_asc",
      SortKey::TitleDesc => "title_desc",
      SortKey::PlatformAsc => "platform_asc",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      SortKey::DateDesc => "Newest first",
      SortKey::DateAsc => "Oldest first",
      SortKey::TitleAsc => "Title A–Z",
      SortKey::TitleDesc => "Title Z–A",
      SortKey::PlatformAsc => "Platform",
    }
  }

  pub fn next(self) -> Self {
    // Safety: position() is always Some for a value of the enum, and ALL is non-empty.
    let idx = Self::ALL.iter().position(|k| *k == self).unwrap_or(0);
    Self::ALL[(idx + 1) % Self::ALL.len()]
  }
}

/// Base letters only: decomposed, combining marks dropped, lowercased.
fn primary_key(s: &str) -> String {
  s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase).collect()
}

/// Locale-style string ordering. Base letters compare first, ignoring accents
/// and case. Then unaccented before accented, then lowercase before uppercase.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
  primary_key(a)
    .cmp(&primary_key(b))
    .then_with(|| {
      let accent_key = |s: &str| s.nfd().map(is_combining_mark).collect::<Vec<bool>>();
      accent_key(a).cmp(&accent_key(b))
    })
    .then_with(|| {
      let case_key = |s: &str| s.chars().map(|c| !c.is_lowercase()).collect::<Vec<bool>>();
      case_key(a).cmp(&case_key(b))
    })
}

/// Case-insensitive match on title, description, platform or any tag.
pub fn matches_search(video: &Video, needle: &str) -> bool {
  video.title.to_lowercase().contains(needle)
    || video.description.to_lowercase().contains(needle)
    || video.platform.to_lowercase().contains(needle)
    || video.tags.iter().any(|t| t.to_lowercase().contains(needle))
}

/// The visible, ordered subset of `videos` for `search` and `sort`.
pub fn view(videos: &[Video], search: &str, sort: SortKey) -> Vec<Video> {
  // Surrounding whitespace is ignored, so a whitespace-only search shows everything.
  let needle = search.trim().to_lowercase();
  let mut visible: Vec<Video> =
    videos.iter().filter(|v| needle.is_empty() || matches_search(v, &needle)).cloned().collect();

  // Ids are unique, so breaking ties on id makes every key a total order.
  match sort {
    SortKey::DateDesc => visible.sort_by(|a, b| b.id.cmp(&a.id)),
    SortKey::DateAsc => visible.sort_by(|a, b| a.id.cmp(&b.id)),
    SortKey::TitleAsc => visible.sort_by(|a, b| locale_cmp(&a.title, &b.title).then(a.id.cmp(&b.id))),
    SortKey::TitleDesc => visible.sort_by(|a, b| locale_cmp(&b.title, &a.title).then(b.id.cmp(&a.id))),
    SortKey::PlatformAsc => visible.sort_by(|a, b| locale_cmp(&a.platform, &b.platform).then(a.id.cmp(&b.id))),
  }
  visible
}
