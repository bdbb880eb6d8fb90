//! URL → metadata resolution.
//!
//! Resolution walks a fallback chain and takes the first usable answer:
//! 1. YouTube oEmbed (YouTube URLs only)
//! 2. noembed, a multi-provider oEmbed proxy
//! 3. A local guess built from the URL alone
//!
//! Remote failures of any kind are logged and swallowed, so `resolve` always
//! returns something the catalog can store.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::constants::constants;
use crate::video::Metadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
  YouTube,
  Instagram,
  TikTok,
  Web,
}

impl Platform {
  pub fn label(self) -> &'static str {
    match self {
      Platform::YouTube => "YouTube",
      Platform::Instagram => "Instagram",
      Platform::TikTok => "TikTok",
      Platform::Web => "Web",
    }
  }
}

/// Platform guess derived from the URL text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
  pub platform: Platform,
  /// Set for `/shorts/` and `/reel/` paths.
  pub is_short: bool,
}

pub fn classify_url(url: &str) -> Classification {
  let url = url.to_lowercase();
  if url.contains("youtube.com") || url.contains("youtu.be") || url.contains("/shorts/") {
    return Classification { platform: Platform::YouTube, is_short: url.contains("/shorts/") };
  }
  if url.contains("instagram.com") || url.contains("/reel/") {
    return Classification { platform: Platform::Instagram, is_short: url.contains("/reel/") };
  }
  if url.contains("tiktok.com") {
    return Classification { platform: Platform::TikTok, is_short: false };
  }
  Classification { platform: Platform::Web, is_short: false }
}

const YOUTUBE_ID_LEN: usize = 11;

fn take_youtube_id(rest: &str) -> Option<String> {
  let id: String = rest.chars().take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_').collect();
  (id.len() == YOUTUBE_ID_LEN).then_some(id)
}

/// Extract the 11-character video id from the common YouTube URL shapes:
/// `watch?v=`, `youtu.be/`, `/shorts/`, `/embed/`, `/v/` and `/live/`.
pub fn extract_youtube_id(url: &str) -> Option<String> {
  for marker in ["youtu.be/", "/shorts/", "/embed/", "/v/", "/live/"] {
    if let Some(pos) = url.find(marker)
      && let Some(id) = take_youtube_id(&url[pos + marker.len()..])
    {
      return Some(id);
    }
  }
  let (_, query) = url.split_once('?')?;
  query.split(['&', '#']).find_map(|pair| pair.strip_prefix("v=")).and_then(take_youtube_id)
}

pub fn youtube_thumbnail(video_id: &str) -> String {
  constants().youtube_thumbnail_url.replace("{id}", video_id)
}

/// Generic stock image with a random cache-busting signature.
pub fn placeholder_thumbnail() -> String {
  format!("{}?sig={}", constants().placeholder_thumbnail_url, rand::random::<u32>())
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

// --- Provider payloads ---

/// YouTube oEmbed response. Every field is optional; see `youtube_metadata` for defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct YouTubeOEmbed {
  title: Option<String>,
  author_name: Option<String>,
  thumbnail_url: Option<String>,
  thumbnail: Option<String>,
}

/// noembed response. A present `error` field means the lookup failed.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NoEmbedResponse {
  title: Option<String>,
  description: Option<String>,
  thumbnail_url: Option<String>,
  provider_name: Option<String>,
  author_name: Option<String>,
  author_url: Option<String>,
  error: Option<serde_json::Value>,
}

/// Title and author come from the endpoint; the thumbnail is rebuilt from the
/// video id when one can be found, since oEmbed tends to return a low-res image.
fn youtube_metadata(payload: YouTubeOEmbed, url: &str) -> Result<Metadata> {
  let title = non_blank(payload.title).ok_or_else(|| anyhow!("YouTube oEmbed response has no title"))?;
  let thumbnail = extract_youtube_id(url)
    .map(|id| youtube_thumbnail(&id))
    .or_else(|| non_blank(payload.thumbnail_url))
    .or_else(|| non_blank(payload.thumbnail))
    .unwrap_or_else(placeholder_thumbnail);
  Ok(Metadata {
    description: title.clone(),
    title,
    thumbnail,
    platform: Platform::YouTube.label().to_string(),
    author: non_blank(payload.author_name),
  })
}

fn noembed_metadata(payload: NoEmbedResponse, classification: Classification) -> Result<Metadata> {
  if let Some(error) = payload.error.filter(|e| !e.is_null()) {
    return Err(anyhow!("noembed reported an error: {}", error));
  }
  let title = non_blank(payload.title).unwrap_or_else(|| "Untitled Video".to_string());
  Ok(Metadata {
    description: non_blank(payload.description).unwrap_or_else(|| title.clone()),
    thumbnail: non_blank(payload.thumbnail_url).unwrap_or_else(placeholder_thumbnail),
    platform: non_blank(payload.provider_name).unwrap_or_else(|| classification.platform.label().to_string()),
    author: non_blank(payload.author_name).or_else(|| non_blank(payload.author_url)),
    title,
  })
}

/// Last-resort metadata synthesized from the URL classification.
pub fn heuristic_metadata(url: &str, classification: Classification) -> Metadata {
  let Classification { platform, is_short } = classification;
  let title = match (platform, is_short) {
    (Platform::YouTube, true) => "YouTube Short",
    (Platform::YouTube, false) => "YouTube Video",
    (Platform::Instagram, true) => "Instagram Reel",
    (Platform::Instagram, false) => "Instagram Video",
    (Platform::TikTok, _) => "TikTok Video",
    (Platform::Web, _) => "Untitled Video",
  };
  let description = match platform {
    Platform::Web => "A video saved from the web.".to_string(),
    other => format!("A video saved from {}.", other.label()),
  };
  let thumbnail = match platform {
    Platform::YouTube => extract_youtube_id(url).map(|id| youtube_thumbnail(&id)).unwrap_or_else(placeholder_thumbnail),
    _ => placeholder_thumbnail(),
  };
  Metadata { title: title.to_string(), description, thumbnail, platform: platform.label().to_string(), author: None }
}

// --- Resolver ---

#[derive(Clone)]
pub struct MetadataResolver {
  client: Client,
  youtube_oembed_url: String,
  noembed_url: String,
}

impl MetadataResolver {
  pub fn new(client: Client, endpoints: &Endpoints) -> Self {
    Self { client, youtube_oembed_url: endpoints.youtube_oembed.clone(), noembed_url: endpoints.noembed.clone() }
  }

  pub async fn resolve(&self, url: &str) -> Metadata {
    let classification = classify_url(url);
    debug!(url = %url, platform = classification.platform.label(), "metadata: classified");

    if classification.platform == Platform::YouTube {
      match self.fetch_youtube(url).await {
        Ok(meta) => {
          info!(url = %url, title = %meta.title, "metadata: resolved via YouTube oEmbed");
          return meta;
        }
        Err(e) => warn!(url = %url, err = %format!("{:#}", e), "metadata: YouTube oEmbed failed, trying noembed"),
      }
    }

    match self.fetch_noembed(url, classification).await {
      Ok(meta) => {
        info!(url = %url, title = %meta.title, "metadata: resolved via noembed");
        meta
      }
      Err(e) => {
        warn!(url = %url, err = %format!("{:#}", e), "metadata: noembed failed, using URL heuristics");
        heuristic_metadata(url, classification)
      }
    }
  }

  async fn fetch_youtube(&self, url: &str) -> Result<Metadata> {
    let endpoint = format!("{}?url={}&format=json", self.youtube_oembed_url, urlencoding::encode(url));
    let response = self.client.get(&endpoint).send().await.context("YouTube oEmbed request failed")?;
    if !response.status().is_success() {
      return Err(anyhow!("YouTube oEmbed returned {}", response.status()));
    }
    let payload: YouTubeOEmbed = response.json().await.context("Failed to parse YouTube oEmbed response")?;
    youtube_metadata(payload, url)
  }

  async fn fetch_noembed(&self, url: &str, classification: Classification) -> Result<Metadata> {
    let endpoint = format!("{}?url={}", self.noembed_url, urlencoding::encode(url));
    let response = self.client.get(&endpoint).send().await.context("noembed request failed")?;
    if !response.status().is_success() {
      return Err(anyhow!("noembed returned {}", response.status()));
    }
    let payload: NoEmbedResponse = response.json().await.context("Failed to parse noembed response")?;
    noembed_metadata(payload, classification)
  }
}
