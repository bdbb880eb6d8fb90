use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use crate::config::Endpoints;
use crate::constants::constants;
use crate::metadata::MetadataResolver;
use crate::tags::TagGenerator;
use crate::video::Metadata;

/// Everything the network half of the add-flow produces for one URL.
#[derive(Debug, Clone)]
pub struct Enrichment {
  pub url: String,
  pub notes: Option<String>,
  pub metadata: Metadata,
  pub tags: Vec<String>,
}

/// Metadata resolution followed by tag generation, sharing one HTTP client.
#[derive(Clone)]
pub struct Enricher {
  resolver: MetadataResolver,
  tagger: TagGenerator,
}

impl Enricher {
  pub fn new(endpoints: &Endpoints, api_key: Option<String>) -> Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(constants().request_timeout_secs))
      .user_agent(concat!("reelstack/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;
    Ok(Self::with_client(client, endpoints, api_key))
  }

  pub fn with_client(client: Client, endpoints: &Endpoints, api_key: Option<String>) -> Self {
    Self {
      resolver: MetadataResolver::new(client.clone(), endpoints),
      tagger: TagGenerator::new(client, api_key, endpoints),
    }
  }

  pub fn has_ai(&self) -> bool {
    self.tagger.has_ai()
  }

  /// Never fails: every remote step degrades to a local fallback.
  pub async fn enrich(&self, url: String, notes: Option<String>) -> Enrichment {
    let metadata = self.resolver.resolve(&url).await;
    let tags = self.tagger.generate(&metadata.title, &metadata.description, &url, &metadata.platform).await;
    info!(url = %url, platform = %metadata.platform, tags = ?tags, "enrich: complete");
    Enrichment { url, notes, metadata, tags }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::Catalog;
  use crate::config::Config;
  use crate::metadata::youtube_thumbnail;
  use crate::test_support::{StubServer, dead_endpoint, test_client};

  fn endpoints(youtube: &str, noembed: &str, gemini: &str) -> Endpoints {
    Endpoints {
      youtube_oembed: youtube.to_string(),
      noembed: noembed.to_string(),
      gemini_base: gemini.to_string(),
      ..Config::default().endpoints()
    }
  }

  async fn add(enricher: &Enricher, catalog: &mut Catalog, url: &str) -> crate::video::Video {
    let e = enricher.enrich(url.to_string(), None).await;
    catalog.add(&e.url, e.metadata, e.tags, e.notes.as_deref()).unwrap()
  }

  #[tokio::test]
  async fn youtube_link_with_working_oembed() {
    let youtube = StubServer::start(200, r#"{"title":"My Clip","author_name":"Jane"}"#).await;
    let dead = dead_endpoint().await;
    let enricher = Enricher::with_client(test_client(), &endpoints(&youtube.base, &dead, &dead), None);
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = Catalog::load(dir.path().join("videos.json")).unwrap();

    let video = add(&enricher, &mut catalog, "https://youtu.be/abcd1234567").await;
    assert_eq!(video.platform, "YouTube");
    assert_eq!(video.title, "My Clip");
    assert_eq!(video.author.as_deref(), Some("Jane"));
    assert_eq!(video.thumbnail, youtube_thumbnail("abcd1234567"));
    assert_eq!(video.tags, ["youtube", "video", "entertainment"]);
  }

  #[tokio::test]
  async fn tiktok_link_with_everything_offline() {
    let dead = dead_endpoint().await;
    let enricher = Enricher::with_client(test_client(), &endpoints(&dead, &dead, &dead), None);
    assert!(!enricher.has_ai());
    let dir = tempfile::tempdir().unwrap();
    let mut catalog = Catalog::load(dir.path().join("videos.json")).unwrap();

    let video = add(&enricher, &mut catalog, "https://www.tiktok.com/@u/video/1").await;
    assert_eq!(video.platform, "TikTok");
    assert_eq!(video.title, "TikTok Video");
    assert_eq!(video.tags, ["tiktok", "short-form", "viral"]);
    for field in [&video.title, &video.description, &video.thumbnail, &video.platform, &video.url] {
      assert!(!field.is_empty());
    }
  }

  #[tokio::test]
  async fn tiktok_link_offline_with_model_tags() {
    let dead = dead_endpoint().await;
    let gemini = StubServer::start(
      200,
      r#"{"candidates":[{"content":{"parts":[{"text":"Dance, Comedy, Trend, Music, Viral, Fun, Challenge, Extra"}]}}]}"#,
    )
    .await;
    let enricher = Enricher::with_client(test_client(), &endpoints(&dead, &dead, &gemini.base), Some("k".to_string()));
    assert!(enricher.has_ai());

    let e = enricher.enrich("https://www.tiktok.com/@u/video/1".to_string(), Some(" note ".to_string())).await;
    assert_eq!(e.metadata.title, "TikTok Video");
    assert_eq!(e.tags.len(), 7);
    assert!(e.tags.iter().all(|t| t.chars().count() < 30 && *t == t.to_lowercase()));
    assert!(gemini.requests()[0].contains("TikTok Video"));
  }
}
