//! NewsAPI client for technology news
//!
//! Undated, untopical requests go to `top-headlines` (technology category).
//! Anything with a topic or a date bound goes to `everything`, which is the
//! only endpoint that accepts `from`/`to`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use newsdesk_core::RawArticle;

use crate::error::NewsError;
use crate::source::{ArticleSource, FetchRequest};
use crate::types::{NewsApiArticle, NewsApiResponse};

/// Largest `pageSize` NewsAPI accepts
pub const MAX_PAGE_SIZE: usize = 100;

/// Default search terms when no topic is given
const DEFAULT_QUERY: &str = "technology";

/// Placeholder title NewsAPI uses for withdrawn articles
const REMOVED_MARKER: &str = "[Removed]";

/// NewsAPI client
pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl NewsApiClient {
    /// Create a new NewsAPI client
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .user_agent("Newsdesk/1.0")
                .build()
                .unwrap_or_else(|_| Client::new()),
            api_key,
            base_url: "https://newsapi.org/v2".to_string(),
        }
    }

    /// Check if the client is configured (has an API key)
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Endpoint and query parameters for a request
    fn build_query(&self, request: &FetchRequest) -> (String, Vec<(&'static str, String)>) {
        let page_size = request.page_size.clamp(1, MAX_PAGE_SIZE).to_string();

        if !request.is_search() {
            let params = vec![
                ("category", "technology".to_string()),
                ("language", "en".to_string()),
                ("pageSize", page_size),
            ];
            return (format!("{}/top-headlines", self.base_url), params);
        }

        let mut params = vec![
            (
                "q",
                request
                    .query
                    .clone()
                    .unwrap_or_else(|| DEFAULT_QUERY.to_string()),
            ),
            ("language", "en".to_string()),
            ("sortBy", "publishedAt".to_string()),
            ("pageSize", page_size),
        ];
        if let Some(from) = request.from {
            params.push(("from", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = request.to {
            params.push(("to", to.format("%Y-%m-%d").to_string()));
        }
        (format!("{}/everything", self.base_url), params)
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    #[instrument(skip(self), fields(from = ?request.from, to = ?request.to))]
    async fn fetch_articles(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, NewsError> {
        if !self.is_configured() {
            return Err(NewsError::InvalidConfig("NEWS_API_KEY is not set".to_string()));
        }

        let (endpoint, params) = self.build_query(request);
        debug!("Fetching {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&endpoint)
            .header("X-Api-Key", &self.api_key)
            .query(&params)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(NewsError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let payload: NewsApiResponse = response
            .json()
            .await
            .map_err(|e| NewsError::ParseError(e.to_string()))?;

        let articles = convert_response(payload)?;
        info!("NewsAPI returned {} usable articles", articles.len());
        Ok(articles)
    }
}

/// Turn a NewsAPI payload into raw articles, skipping unusable entries
pub fn convert_response(payload: NewsApiResponse) -> Result<Vec<RawArticle>, NewsError> {
    if payload.status != "ok" {
        let code = payload.code.unwrap_or_default();
        if code == "rateLimited" {
            return Err(NewsError::RateLimited);
        }
        return Err(NewsError::ApiError {
            status: 200,
            message: payload
                .message
                .unwrap_or_else(|| format!("NewsAPI error {}", code)),
        });
    }

    Ok(payload
        .articles
        .into_iter()
        .filter_map(convert_article)
        .collect())
}

fn convert_article(article: NewsApiArticle) -> Option<RawArticle> {
    let title = article.title?.trim().to_string();
    let url = article.url?.trim().to_string();
    if title.is_empty() || title == REMOVED_MARKER || url.is_empty() {
        return None;
    }

    let published_at = match article
        .published_at
        .as_deref()
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
    {
        Some(d) => d.with_timezone(&Utc),
        None => {
            warn!("Skipping article without a valid publish time: {}", url);
            return None;
        }
    };

    let source = article
        .source
        .name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    Some(RawArticle {
        title,
        description: article.description.filter(|d| !d.is_empty()),
        url,
        source,
        published_at,
        image_url: article.url_to_image.filter(|u| !u.is_empty()),
    })
}
