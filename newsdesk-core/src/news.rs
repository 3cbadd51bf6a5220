//! News data structures for the aggregation pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// An article as returned by the upstream news source, before processing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    pub title: String,
    /// Upstream description/excerpt, used as summarization input
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    /// Publisher name (e.g., "The Verge")
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A processed article as served to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable identifier (hash of the normalized URL)
    pub id: String,
    pub title: String,
    /// AI-generated summary, empty until generated
    pub summary: String,
    pub url: String,
    pub source: String,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Article {
    /// Build an article from an upstream record. The summary starts empty.
    pub fn from_raw(raw: RawArticle) -> Self {
        Self {
            id: article_id(&raw.url),
            title: raw.title,
            summary: String::new(),
            url: raw.url,
            source: raw.source,
            published_at: raw.published_at,
            image_url: raw.image_url,
            description: raw.description,
        }
    }

    /// Description text, or an empty string when the source gave none
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

impl AsRef<Article> for Article {
    fn as_ref(&self) -> &Article {
        self
    }
}

impl From<RawArticle> for Article {
    fn from(raw: RawArticle) -> Self {
        Article::from_raw(raw)
    }
}

/// Normalize a URL for identity comparisons: trimmed, lowercased, fragment
/// removed and without trailing slashes.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    let without_fragment = trimmed.split('#').next().unwrap_or(trimmed);
    without_fragment.trim_end_matches('/').to_lowercase()
}

/// Stable article id derived from the normalized URL
pub fn article_id(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalize_url(url).as_bytes());
    hex::encode(&hasher.finalize()[..6])
}

/// One page of a cached result set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsPage {
    /// Articles on the requested page
    pub articles: Vec<Article>,
    /// Number of articles on this page
    pub count: usize,
    /// Total number of articles in the result set for the window
    pub total: usize,
    /// Whether the result set came from the cache
    pub cached: bool,
    /// Age of the result set in seconds (0 when freshly fetched)
    pub cache_age: u64,
    /// Set when an expired result set is served because the upstream failed
    #[serde(default)]
    pub stale: bool,
    /// Trending topics extracted from the result set titles
    pub topics: Vec<String>,
    pub current_page: usize,
    pub total_pages: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(url: &str) -> RawArticle {
        RawArticle {
            title: "Chipmaker unveils new GPU".to_string(),
            description: Some("A new GPU".to_string()),
            url: url.to_string(),
            source: "Wired".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 1, 3, 12, 0, 0).unwrap(),
            image_url: None,
        }
    }

    #[test]
    fn test_normalize_url() {
        assert_eq!(
            normalize_url("  HTTPS://Example.com/Story/ "),
            "https://example.com/story"
        );
        assert_eq!(
            normalize_url("https://example.com/story#comments"),
            "https://example.com/story"
        );
    }

    #[test]
    fn test_article_id_is_stable_across_url_spellings() {
        let a = article_id("https://example.com/story");
        let b = article_id("https://EXAMPLE.com/story/");
        assert_eq!(a, b);
        assert_eq!(a.len(), 12);
        assert_ne!(a, article_id("https://example.com/other"));
    }

    #[test]
    fn test_from_raw_starts_with_empty_summary() {
        let article = Article::from_raw(raw("https://example.com/gpu"));
        assert!(article.summary.is_empty());
        assert_eq!(article.id, article_id("https://example.com/gpu"));
        assert_eq!(article.description_text(), "A new GPU");
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let article = Article::from_raw(raw("https://example.com/gpu"));
        let json = serde_json::to_value(&article).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("imageUrl").is_none());
    }
}
