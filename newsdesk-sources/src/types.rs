//! API-specific types for NewsAPI

use serde::Deserialize;

/// NewsAPI response envelope (both `top-headlines` and `everything`)
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    /// "ok" or "error"
    pub status: String,
    /// Total number of matching articles upstream
    #[serde(rename = "totalResults", default)]
    pub total_results: Option<usize>,
    /// Articles on this page
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
    /// Machine-readable error code (when status is "error")
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable error message (when status is "error")
    #[serde(default)]
    pub message: Option<String>,
}

/// A single NewsAPI article
#[derive(Debug, Deserialize)]
pub struct NewsApiArticle {
    /// Publisher
    pub source: NewsApiSource,
    /// Author name
    #[serde(default)]
    pub author: Option<String>,
    /// Headline
    #[serde(default)]
    pub title: Option<String>,
    /// Short description/excerpt
    #[serde(default)]
    pub description: Option<String>,
    /// Canonical article URL
    #[serde(default)]
    pub url: Option<String>,
    /// Lead image URL
    #[serde(rename = "urlToImage", default)]
    pub url_to_image: Option<String>,
    /// Publication time (ISO 8601)
    #[serde(rename = "publishedAt", default)]
    pub published_at: Option<String>,
}

/// NewsAPI publisher reference
#[derive(Debug, Deserialize)]
pub struct NewsApiSource {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}
