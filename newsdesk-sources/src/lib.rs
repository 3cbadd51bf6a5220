//! Upstream clients for the Newsdesk pipeline
//!
//! This crate provides clients for:
//! - NewsAPI: top headlines and dated searches (the article source)
//! - Article pages: HTML scraping of full article text for long summaries

pub mod content_scraper;
pub mod error;
pub mod newsapi;
pub mod source;
pub mod types;

pub use content_scraper::{extract_article_text, HtmlScraper};
pub use error::NewsError;
pub use newsapi::NewsApiClient;
pub use source::{ArticleSource, ContentScraper, FetchRequest};
