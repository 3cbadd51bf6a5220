//! News Cache
//!
//! Keys and values for the two process-lifetime caches: processed result
//! sets keyed by window and topic, and full-article summaries keyed by URL.

use std::fmt;

use chrono::NaiveDate;
use newsdesk_core::{normalize_url, Article, DateRange, FullSummary, NewsQuery};

use crate::range_fetcher::FetchReport;
use crate::ttl_cache::TtlCache;

/// Bumped whenever the shape or processing of cached result sets changes,
/// so entries built by older logic are never read back.
pub const CACHE_SCHEMA_VERSION: u32 = 2;

/// Identity of a processed result set. Independent of page and limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    range: DateRange,
    /// Lowercased topic
    topic: Option<String>,
    version: u32,
}

impl CacheKey {
    pub fn new(range: DateRange, topic: Option<&str>) -> Self {
        Self {
            range,
            topic: topic
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty()),
            version: CACHE_SCHEMA_VERSION,
        }
    }

    pub fn for_query(query: &NewsQuery) -> Self {
        Self::new(*query.range(), query.topic())
    }

    pub fn range(&self) -> &DateRange {
        &self.range
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "news_{}_{}_v{}",
            self.range.key_fragment(),
            self.topic.as_deref().unwrap_or("all"),
            self.version
        )
    }
}

/// A processed result set
#[derive(Debug, Clone)]
pub struct CachedFeed {
    /// Final ordered articles
    pub articles: Vec<Article>,
    /// Fetch day of each article, aligned with `articles`
    pub days: Vec<Option<NaiveDate>>,
    /// Calendar days the fetch covered, 1 for a single query
    pub span_days: usize,
    pub topics: Vec<String>,
    /// Sample size this set was built for
    pub target: usize,
    pub report: FetchReport,
}

impl CachedFeed {
    /// Whether this set was sampled at least as large as `target`
    pub fn covers(&self, target: usize) -> bool {
        self.target >= target
    }

    /// Built while some upstream day queries were failing
    pub fn is_partial(&self) -> bool {
        self.report.is_partial()
    }

    pub fn find(&self, id: &str) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn find_by_url(&self, url: &str) -> Option<&Article> {
        let wanted = normalize_url(url);
        self.articles.iter().find(|a| normalize_url(&a.url) == wanted)
    }
}

/// Result sets keyed by window and topic
pub type NewsCache = TtlCache<CacheKey, CachedFeed>;

/// Full-article summaries keyed by normalized URL
pub type SummaryCache = TtlCache<String, FullSummary>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_ignores_topic_case_and_page() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 10),
        )
        .unwrap();
        let a = NewsQuery::new(20, 1, range, Some("Rust ".to_string()), false).unwrap();
        let b = NewsQuery::new(50, 3, range, Some("rust".to_string()), true).unwrap();
        assert_eq!(CacheKey::for_query(&a), CacheKey::for_query(&b));
        assert_eq!(
            CacheKey::for_query(&a).to_string(),
            "news_2024-01-01_2024-01-10_rust_v2"
        );
    }

    #[test]
    fn test_default_window_key() {
        let key = CacheKey::new(DateRange::unbounded(), None);
        assert_eq!(key.to_string(), "news_default_all_v2");
        assert_ne!(key, CacheKey::new(DateRange::unbounded(), Some("ai")));
    }

    #[test]
    fn test_covers() {
        let feed = CachedFeed {
            articles: Vec::new(),
            days: Vec::new(),
            span_days: 1,
            topics: Vec::new(),
            target: 60,
            report: FetchReport {
                attempted: 10,
                failed: 2,
            },
        };
        assert!(feed.covers(30));
        assert!(feed.covers(60));
        assert!(!feed.covers(90));
        assert!(feed.is_partial());
    }
}
