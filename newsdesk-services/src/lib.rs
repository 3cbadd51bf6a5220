//! Ingestion pipeline and services for Newsdesk
//!
//! This crate turns upstream articles into cached, paginated result sets:
//! range fetching, deduplication, scoring, fair sampling, TTL caching with
//! fetch coalescing, and sliding-window rate limiting for the endpoints
//! that call the text service.

pub mod clock;
pub mod config;
pub mod dedup;
pub mod error;
pub mod housekeeping;
pub mod news_cache;
pub mod news_service;
pub mod paginator;
pub mod range_fetcher;
pub mod rate_limiter;
pub mod sampler;
pub mod scorer;
pub mod similarity;
pub mod summary_service;
pub mod ttl_cache;

pub use clock::{Clock, MockClock, SharedClock, SystemClock};
pub use config::{CacheConfig, PipelineConfig, RateLimitConfig, ScoringWeights};
pub use dedup::Deduplicator;
pub use error::{PipelineError, PipelineResult};
pub use news_cache::{CacheKey, CachedFeed, CACHE_SCHEMA_VERSION};
pub use news_service::{NewsCacheStats, NewsService};
pub use paginator::{paginate, Page};
pub use range_fetcher::{FetchPlan, FetchReport, FetchedArticle, RangeFetcher};
pub use rate_limiter::{RateLimiter, RateLimiterStats, EXPLAIN_SCOPE, FULL_SUMMARY_SCOPE};
pub use sampler::Sampler;
pub use scorer::{ScoredArticle, Scorer};
pub use similarity::{normalize_title, SimilarityKind, TitleSimilarity};
pub use summary_service::SummaryService;
pub use ttl_cache::{CacheHit, TtlCache};
