//! Full-article summaries and passage explanations
//!
//! Both operations call the text service, so both pass through the rate
//! limiter before doing anything else. Full summaries are cached per URL
//! and concurrent requests for one URL share a single scrape.

use std::sync::Arc;

use newsdesk_ai::TextService;
use newsdesk_core::{normalize_url, Explanation, FullSummary, QueryError};
use newsdesk_sources::ContentScraper;
use tracing::{info, instrument};

use crate::clock::SharedClock;
use crate::config::{CacheConfig, RateLimitConfig};
use crate::error::{PipelineError, PipelineResult};
use crate::news_cache::SummaryCache;
use crate::news_service::NewsService;
use crate::rate_limiter::{RateLimiter, RateLimiterStats, EXPLAIN_SCOPE, FULL_SUMMARY_SCOPE};

/// Shortest passage worth explaining
const MIN_SELECTION_CHARS: usize = 10;

/// Title used in the prompt when the URL is not in any cached result set
const DEFAULT_TITLE: &str = "Article";

pub struct SummaryService {
    scraper: Arc<dyn ContentScraper>,
    text: Arc<dyn TextService>,
    news: Arc<NewsService>,
    cache: SummaryCache,
    limiter: RateLimiter,
}

impl SummaryService {
    pub fn new(
        scraper: Arc<dyn ContentScraper>,
        text: Arc<dyn TextService>,
        news: Arc<NewsService>,
        cache_config: &CacheConfig,
        rate_limit: &RateLimitConfig,
        clock: SharedClock,
    ) -> Self {
        Self {
            scraper,
            text,
            news,
            cache: SummaryCache::new(
                "full_summary",
                cache_config.full_summary_ttl,
                cache_config.stale_retention,
                Arc::clone(&clock),
            ),
            limiter: RateLimiter::new(rate_limit, clock, "summarize"),
        }
    }

    /// Comprehensive summary of the article at `url`
    #[instrument(skip(self))]
    pub async fn full_summary(&self, url: &str) -> PipelineResult<FullSummary> {
        let url = url.trim();
        if url.is_empty() {
            return Err(QueryError::invalid_input("url must not be empty").into());
        }
        self.admit(FULL_SUMMARY_SCOPE)?;

        let hit = self
            .cache
            .get_or_fetch(normalize_url(url), false, |_| true, || self.generate(url))
            .await?;

        Ok(FullSummary {
            cached: hit.cached,
            ..(*hit.value).clone()
        })
    }

    /// Plain-language explanation of `selected_text`
    #[instrument(skip(self, selected_text, context))]
    pub async fn explain(
        &self,
        selected_text: &str,
        context: Option<&str>,
    ) -> PipelineResult<Explanation> {
        let selected = selected_text.trim();
        if selected.chars().count() < MIN_SELECTION_CHARS {
            return Err(QueryError::invalid_input(format!(
                "Selected text must be at least {} characters long",
                MIN_SELECTION_CHARS
            ))
            .into());
        }
        self.admit(EXPLAIN_SCOPE)?;

        let explanation = self
            .text
            .explain(selected, context.map(str::trim).unwrap_or_default())
            .await?;
        Ok(Explanation { explanation })
    }

    /// Evict expired summaries and idle rate-limit scopes
    pub fn sweep(&self) -> (usize, usize) {
        (self.cache.sweep(), self.limiter.sweep())
    }

    /// Retained full summaries
    pub fn cached_summaries(&self) -> usize {
        self.cache.len()
    }

    pub fn limiter_stats(&self) -> RateLimiterStats {
        self.limiter.stats()
    }

    fn admit(&self, scope: &str) -> PipelineResult<()> {
        if self.limiter.allow(scope) {
            return Ok(());
        }
        let retry_after_secs = self
            .limiter
            .retry_after(scope)
            .map(|d| d.as_secs().max(1))
            .unwrap_or(1);
        Err(PipelineError::RateLimitExceeded {
            scope: scope.to_string(),
            retry_after_secs,
        })
    }

    async fn generate(&self, url: &str) -> PipelineResult<FullSummary> {
        info!("Fetching full article content from {}", url);
        let content = self
            .scraper
            .scrape_content(url)
            .await
            .map_err(|e| PipelineError::content(url, e))?;

        let title = self
            .news
            .find_by_url(url)
            .map(|article| article.title)
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());

        let summary = self.text.summarize_full(&title, &content).await?;
        let summary = FullSummary::new(url, summary);
        info!(
            "Generated {}-word summary from {} characters",
            summary.word_count,
            content.len()
        );
        Ok(summary)
    }
}
