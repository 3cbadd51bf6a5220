//! Core types for Newsdesk
//!
//! This crate defines the shared data structures used across the workspace,
//! including article representations, date ranges and validated queries.

pub mod error;
pub mod news;
pub mod query;
pub mod summary;

pub use error::QueryError;
pub use news::{article_id, normalize_url, Article, NewsPage, RawArticle};
pub use query::{DateRange, NewsQuery, MAX_LIMIT};
pub use summary::{Explanation, FullSummary};
