//! Collaborator traits consumed by the pipeline

use async_trait::async_trait;
use chrono::NaiveDate;

use newsdesk_core::RawArticle;

use crate::error::NewsError;

/// One upstream query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Free-text query (topic), `None` for general technology news
    pub query: Option<String>,
    /// Inclusive lower bound on publish date
    pub from: Option<NaiveDate>,
    /// Inclusive upper bound on publish date
    pub to: Option<NaiveDate>,
    /// Number of articles requested
    pub page_size: usize,
}

impl FetchRequest {
    /// A request covering exactly one calendar day
    pub fn for_day(query: Option<String>, day: NaiveDate, page_size: usize) -> Self {
        Self {
            query,
            from: Some(day),
            to: Some(day),
            page_size,
        }
    }

    /// Whether the request needs the dated search rather than top headlines
    pub fn is_search(&self) -> bool {
        self.query.is_some() || self.from.is_some() || self.to.is_some()
    }
}

/// External news source
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, NewsError>;
}

/// External full-text fetcher, used only by the full-summary path
#[async_trait]
pub trait ContentScraper: Send + Sync {
    async fn scrape_content(&self, url: &str) -> Result<String, NewsError>;
}
