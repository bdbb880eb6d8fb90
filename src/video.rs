use serde::{Deserialize, Serialize};

/// A saved entry in the catalog.
///
/// Serialized with camelCase keys; the persisted file is a JSON array of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
  /// Creation time in epoch milliseconds, bumped when needed to stay unique.
  pub id: i64,
  pub url: String,
  pub title: String,
  pub description: String,
  pub thumbnail: String,
  pub platform: String,
  pub tags: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub author: Option<String>,
  pub saved_at: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub notes: Option<String>,
}

/// Best-effort descriptive metadata for a URL, as produced by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
  pub title: String,
  pub description: String,
  pub thumbnail: String,
  pub platform: String,
  pub author: Option<String>,
}
