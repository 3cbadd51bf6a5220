//! News Service
//!
//! Serves paginated news for a window and topic. A cache miss (or forced
//! refresh) runs the whole pipeline once per key:
//! fetch -> dedup -> score -> sample -> summaries -> topics -> cache.
//! Pages are sliced from the cached result set, so paging never refetches.
//! For a per-day fetch the set is served in fair page order, so each page
//! holds at most `ceil(limit / days) + slack` articles from any one day.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use newsdesk_ai::{TextService, TopicExtractor};
use newsdesk_core::{Article, DateRange, NewsPage, NewsQuery};
use newsdesk_sources::ArticleSource;
use tracing::{debug, info, instrument, warn};

use crate::clock::SharedClock;
use crate::config::{CacheConfig, PipelineConfig};
use crate::dedup::Deduplicator;
use crate::error::{PipelineError, PipelineResult};
use crate::news_cache::{CacheKey, CachedFeed, NewsCache};
use crate::paginator::paginate;
use crate::range_fetcher::RangeFetcher;
use crate::sampler::Sampler;
use crate::scorer::Scorer;
use crate::ttl_cache::CacheHit;

/// Longest description used as a summary when the text service fails
const FALLBACK_SUMMARY_CHARS: usize = 200;

/// Snapshot of the result-set cache
#[derive(Debug, Clone, Copy, Default)]
pub struct NewsCacheStats {
    /// Retained result sets, fresh or stale
    pub entries: usize,
    /// Articles across fresh result sets
    pub fresh_articles: usize,
    /// Fresh result sets built while some day queries were failing
    pub partial_result_sets: usize,
}

/// News pipeline and result-set cache
pub struct NewsService {
    fetcher: RangeFetcher,
    dedup: Deduplicator,
    scorer: Scorer,
    sampler: Sampler,
    text: Arc<dyn TextService>,
    topics: TopicExtractor,
    cache: NewsCache,
    clock: SharedClock,
    config: PipelineConfig,
}

impl NewsService {
    /// Create a new NewsService
    pub fn new(
        source: Arc<dyn ArticleSource>,
        text: Arc<dyn TextService>,
        config: PipelineConfig,
        cache_config: &CacheConfig,
        clock: SharedClock,
    ) -> Self {
        info!(
            "Initializing NewsService (similarity: {:?} >= {}, multiplier: {}, cache ttl: {}s)",
            config.similarity,
            config.similarity_threshold,
            config.sample_multiplier,
            cache_config.feed_ttl.as_secs()
        );
        Self {
            fetcher: RangeFetcher::new(source, &config),
            dedup: Deduplicator::new(config.similarity, config.similarity_threshold),
            scorer: Scorer::new(config.scoring.clone()),
            sampler: Sampler::new(config.fairness_slack),
            text,
            topics: TopicExtractor::new(),
            cache: NewsCache::new(
                "news",
                cache_config.feed_ttl,
                cache_config.stale_retention,
                Arc::clone(&clock),
            ),
            clock,
            config,
        }
    }

    /// Result set size built for a page size of `limit`
    pub fn target_for(&self, limit: usize) -> usize {
        limit.max(1) * self.config.sample_multiplier.max(1)
    }

    /// One page of news for `query`.
    ///
    /// Falls back to a retained stale result set when the upstream is down.
    #[instrument(skip(self, query), fields(page = query.page(), limit = query.limit()))]
    pub async fn query(&self, query: &NewsQuery) -> PipelineResult<NewsPage> {
        self.fetcher.check_range(query.range())?;
        let key = CacheKey::for_query(query);
        let target = self.target_for(query.limit());

        let result = self
            .cache
            .get_or_fetch(
                key.clone(),
                query.force_refresh(),
                |feed| feed.covers(target),
                || self.build_feed(&key, target),
            )
            .await;

        let hit = match result {
            Ok(hit) => hit,
            Err(PipelineError::UpstreamUnavailable(reason)) => match self.cache.get_stale(&key) {
                Some(previous) => {
                    warn!(
                        "Upstream unavailable for {}, serving result set aged {}s: {}",
                        key, previous.age_secs, reason
                    );
                    previous
                }
                None => return Err(PipelineError::UpstreamUnavailable(reason)),
            },
            Err(e) => return Err(e),
        };

        Ok(self.page_of(&hit, query))
    }

    /// Drop the cached result set for a window and topic
    pub fn invalidate(&self, range: DateRange, topic: Option<&str>) -> bool {
        self.cache.invalidate(&CacheKey::new(range, topic))
    }

    /// Article with `id` from any fresh result set
    pub fn find_article(&self, id: &str) -> Option<Article> {
        self.cache
            .fresh_values()
            .iter()
            .find_map(|feed| feed.find(id).cloned())
    }

    /// Article with `url` from any fresh result set
    pub fn find_by_url(&self, url: &str) -> Option<Article> {
        self.cache
            .fresh_values()
            .iter()
            .find_map(|feed| feed.find_by_url(url).cloned())
    }

    /// Evict result sets past their retention
    pub fn sweep(&self) -> usize {
        self.cache.sweep()
    }

    pub fn cache_stats(&self) -> NewsCacheStats {
        let fresh = self.cache.fresh_values();
        NewsCacheStats {
            entries: self.cache.len(),
            fresh_articles: fresh.iter().map(|feed| feed.articles.len()).sum(),
            partial_result_sets: fresh.iter().filter(|feed| feed.is_partial()).count(),
        }
    }

    fn page_of(&self, hit: &CacheHit<CachedFeed>, query: &NewsQuery) -> NewsPage {
        let feed = &hit.value;
        if feed.is_partial() {
            debug!(
                "Serving {} built with {}/{} day queries failed",
                CacheKey::for_query(query),
                feed.report.failed,
                feed.report.attempted
            );
        }

        let served: Vec<&Article> = self
            .sampler
            .page_order(&feed.days, query.limit(), feed.span_days)
            .into_iter()
            .map(|idx| &feed.articles[idx])
            .collect();
        let page = paginate(&served, query.page(), query.limit());

        NewsPage {
            articles: page.items.iter().map(|a| (*a).clone()).collect(),
            count: page.items.len(),
            total: feed.articles.len(),
            cached: hit.cached,
            cache_age: hit.age_secs,
            stale: hit.stale,
            topics: feed.topics.clone(),
            current_page: page.current_page,
            total_pages: page.total_pages,
        }
    }

    async fn build_feed(&self, key: &CacheKey, target: usize) -> PipelineResult<CachedFeed> {
        info!("Building result set for {} (target {})", key, target);

        let fetched = self.fetcher.fetch(key.range(), key.topic(), target).await?;
        let pool_size = fetched.articles.len();

        let unique = self.dedup.dedup(fetched.articles);
        let unique_size = unique.len();
        let scored = self.scorer.score(unique, self.clock.now());
        let sampled = self.sampler.sample(scored, target, fetched.days);

        let (articles, days): (Vec<Article>, Vec<Option<NaiveDate>>) =
            sampled.into_iter().map(|s| (s.article, s.day)).unzip();
        info!(
            "Pipeline for {}: {} fetched, {} unique, {} sampled",
            key,
            pool_size,
            unique_size,
            articles.len()
        );

        let articles = self.summarize_all(articles).await;
        let topics = self.extract_topics(&articles).await;

        Ok(CachedFeed {
            articles,
            days,
            span_days: fetched.days,
            topics,
            target,
            report: fetched.report,
        })
    }

    /// Fill in short summaries with bounded concurrency, keeping order
    async fn summarize_all(&self, articles: Vec<Article>) -> Vec<Article> {
        let concurrency = self.config.summary_concurrency.max(1);
        stream::iter(articles)
            .map(|mut article| {
                let text = Arc::clone(&self.text);
                async move {
                    let result = text
                        .summarize(&article.title, article.description_text())
                        .await;
                    article.summary = match result {
                        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
                        Ok(_) => fallback_summary(article.description_text()),
                        Err(e) => {
                            debug!("Summary failed for {}: {}", article.url, e);
                            fallback_summary(article.description_text())
                        }
                    };
                    article
                }
            })
            .buffered(concurrency)
            .collect()
            .await
    }

    async fn extract_topics(&self, articles: &[Article]) -> Vec<String> {
        if articles.is_empty() {
            return Vec::new();
        }
        let titles: Vec<String> = articles.iter().map(|a| a.title.clone()).collect();

        match self.text.extract_topics(&titles).await {
            Ok(topics) if !topics.is_empty() => topics,
            Ok(_) => self.topics.extract(&titles),
            Err(e) => {
                warn!("Topic extraction failed, using keyword table: {}", e);
                self.topics.extract(&titles)
            }
        }
    }
}

/// Description cut to 200 characters, with `...` appended when cut
pub fn fallback_summary(description: &str) -> String {
    let description = description.trim();
    if description.chars().count() > FALLBACK_SUMMARY_CHARS {
        let cut: String = description.chars().take(FALLBACK_SUMMARY_CHARS).collect();
        format!("{}...", cut)
    } else {
        description.to_string()
    }
}
