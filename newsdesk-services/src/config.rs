//! Tunables for the ingestion pipeline, cache and rate limiter

use std::time::Duration;

use crate::similarity::SimilarityKind;

/// Weights used by the scorer
#[derive(Debug, Clone)]
pub struct ScoringWeights {
    /// Weight of the recency term (recency itself is in `0.0..=1.0`)
    pub recency: f64,
    /// Age at which the recency term halves
    pub recency_half_life_hours: f64,
    /// Subtracted once per article already seen from the same source
    pub diversity_penalty: f64,
    /// Added once per high-signal keyword present in the title
    pub keyword: f64,
    /// High-signal title keywords (matched case-insensitively on word boundaries)
    pub keywords: Vec<String>,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            recency: 1.0,
            recency_half_life_hours: 24.0,
            diversity_penalty: 0.15,
            keyword: 0.2,
            keywords: [
                "launch", "launches", "announces", "unveils", "release", "releases",
                "breach", "acquires", "acquisition", "funding", "ai", "security",
                "exclusive", "breakthrough",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Configuration for the news pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Near-duplicate threshold on normalized titles (`0.0..=1.0`)
    pub similarity_threshold: f64,
    /// Title similarity measure
    pub similarity: SimilarityKind,
    pub scoring: ScoringWeights,
    /// Result set size is `limit * sample_multiplier`
    pub sample_multiplier: usize,
    /// Upstream pool target is the result set size times this factor
    pub oversample_factor: usize,
    /// Extra articles a single day may contribute above its proportional share
    pub fairness_slack: usize,
    /// Ranges spanning at least this many days are fetched one day at a time
    pub per_day_threshold_days: usize,
    /// Longest accepted range; bounds the upstream calls one request can cause
    pub max_range_days: usize,
    /// Concurrent per-day upstream calls
    pub max_parallel_fetches: usize,
    /// Largest page size the upstream accepts
    pub max_page_size: usize,
    /// Concurrent short-summary calls
    pub summary_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            similarity: SimilarityKind::TokenJaccard,
            scoring: ScoringWeights::default(),
            sample_multiplier: 3,
            oversample_factor: 2,
            fairness_slack: 1,
            per_day_threshold_days: 5,
            max_range_days: 31,
            max_parallel_fetches: 4,
            max_page_size: 100,
            summary_concurrency: 8,
        }
    }
}

/// Cache lifetimes
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for processed result sets
    pub feed_ttl: Duration,
    /// TTL for full-article summaries
    pub full_summary_ttl: Duration,
    /// How long expired entries are retained for stale fallback
    pub stale_retention: Duration,
    /// Interval of the background sweep
    pub sweep_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            feed_ttl: Duration::from_secs(15 * 60),
            full_summary_ttl: Duration::from_secs(24 * 60 * 60),
            stale_retention: Duration::from_secs(60 * 60),
            sweep_interval: Duration::from_secs(5 * 60),
        }
    }
}

/// Sliding-window admission settings
#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    /// Accepted calls per window and scope
    pub quota: usize,
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            quota: 10,
            window: Duration::from_secs(60),
        }
    }
}
