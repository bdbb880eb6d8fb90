//! Tag generation for newly saved videos.
//!
//! With a Gemini key the model is asked for 5–7 comma-separated tags; without
//! one (or when the call fails) a fixed per-platform set is used instead.

use anyhow::{Context, Result, anyhow};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Endpoints;
use crate::constants::constants;

/// Deterministic tags used when no model is available.
pub fn static_tags(platform: &str) -> Vec<String> {
  let tags: &[&str] = match platform.to_lowercase().as_str() {
    "youtube" => &["youtube", "video", "entertainment"],
    "instagram" => &["instagram", "reel", "social"],
    "tiktok" => &["tiktok", "short-form", "viral"],
    _ => &["video", "content", "media"],
  };
  tags.iter().map(|t| t.to_string()).collect()
}

/// Used when the model answered but nothing in the answer was a usable tag.
fn fallback_tags(platform: &str) -> Vec<String> {
  let limit = constants().max_tag_chars.saturating_sub(1);
  let platform_tag: String = platform.trim().to_lowercase().chars().take(limit).collect();
  let mut tags = Vec::new();
  for tag in [platform_tag.trim_end(), "video", "content"] {
    if !tag.is_empty() && !tags.iter().any(|t: &String| t == tag) {
      tags.push(tag.to_string());
    }
  }
  tags
}

fn is_short_form(url: &str) -> bool {
  let url = url.to_lowercase();
  url.contains("/shorts/") || url.contains("/reel/") || url.contains("tiktok.com")
}

fn build_prompt(title: &str, description: &str, url: &str, platform: &str) -> String {
  let format_hint = if is_short_form(url) { "short-form" } else { "long-form" };
  format!(
    "Suggest tags for a saved {format_hint} video so it is easy to find later.\n\
     Title: {title}\n\
     Description: {description}\n\
     URL: {url}\n\
     Platform: {platform}\n\n\
     Return between 5 and 7 short, lowercase tags describing the topic, genre and mood, \
     as a single comma-separated list. Return only the tags, with no numbering, hashtags or extra text."
  )
}

/// Split a model answer into clean tags: lowercase, de-duplicated, each shorter
/// than `max_tag_chars`, at most `max_tags` of them.
pub fn parse_tags(text: &str) -> Vec<String> {
  let c = constants();
  let mut tags: Vec<String> = Vec::new();
  for raw in text.split([',', '\n']) {
    let tag = raw
      .trim()
      .trim_start_matches(|ch: char| ch == '-' || ch == '*' || ch == '•' || ch == '#' || ch.is_whitespace())
      .trim_matches(|ch: char| ch == '"' || ch == '\'' || ch == '`' || ch == '.' || ch.is_whitespace())
      .to_lowercase();
    if tag.is_empty() || tag.chars().count() >= c.max_tag_chars || tags.contains(&tag) {
      continue;
    }
    tags.push(tag);
    if tags.len() == c.max_tags {
      break;
    }
  }
  tags
}

// --- Gemini payloads ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateResponse {
  candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
  content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CandidateContent {
  parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Part {
  text: Option<String>,
}

impl GenerateResponse {
  fn text(self) -> Option<String> {
    let text: String = self
      .candidates
      .into_iter()
      .next()?
      .content
      .parts
      .into_iter()
      .filter_map(|p| p.text)
      .collect::<Vec<_>>()
      .join("");
    (!text.trim().is_empty()).then_some(text)
  }
}

#[derive(Clone)]
pub struct TagGenerator {
  client: Client,
  api_key: Option<String>,
  endpoint: String,
}

impl TagGenerator {
  pub fn new(client: Client, api_key: Option<String>, endpoints: &Endpoints) -> Self {
    let endpoint = format!("{}/models/{}:generateContent", endpoints.gemini_base, endpoints.gemini_model);
    Self { client, api_key, endpoint }
  }

  pub fn has_ai(&self) -> bool {
    self.api_key.is_some()
  }

  pub async fn generate(&self, title: &str, description: &str, url: &str, platform: &str) -> Vec<String> {
    let Some(ref api_key) = self.api_key else {
      debug!(platform, "tags: no API key, using static tags");
      return static_tags(platform);
    };

    let prompt = build_prompt(title, description, url, platform);
    match self.complete(&prompt, api_key).await {
      Ok(text) => {
        let tags = parse_tags(&text);
        if tags.is_empty() {
          warn!(response = %text, "tags: model answer had no usable tags");
          fallback_tags(platform)
        } else {
          info!(count = tags.len(), "tags: generated by model");
          tags
        }
      }
      Err(e) => {
        warn!(err = %format!("{:#}", e), "tags: model call failed, using static tags");
        static_tags(platform)
      }
    }
  }

  /// Single attempt, bounded by `ai_timeout_secs`. No retries.
  async fn complete(&self, prompt: &str, api_key: &str) -> Result<String> {
    let body = serde_json::json!({
      "contents": [{
        "parts": [{ "text": prompt }]
      }],
      "generationConfig": {
        "temperature": 0.4
      }
    });

    let response = self
      .client
      .post(&self.endpoint)
      .header("x-goog-api-key", api_key)
      .timeout(Duration::from_secs(constants().ai_timeout_secs))
      .json(&body)
      .send()
      .await
      .context("Gemini request failed")?;

    if !response.status().is_success() {
      return Err(anyhow!("Gemini returned {}", response.status()));
    }

    let parsed: GenerateResponse = response.json().await.context("Failed to parse Gemini response")?;
    parsed.text().ok_or_else(|| anyhow!("Gemini response contained no text"))
  }
}
