//! Upstream fetch planning for a date range
//!
//! Short or open ranges are covered by one query. Ranges of
//! `per_day_threshold_days` or more are split into one query per day, each
//! asking for an equal share of the pool, because a single wide query comes
//! back dominated by the most recent days. Per-day queries run concurrently
//! with bounded fan-out; a failed day is logged and skipped, and only a
//! range where every day failed is an error. Ranges longer than
//! `max_range_days` are rejected before any call is made.

use std::sync::Arc;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use newsdesk_core::{Article, DateRange, QueryError, RawArticle};
use newsdesk_sources::{ArticleSource, FetchRequest, NewsError};
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// A fetched article tagged with the day query that produced it
#[derive(Debug, Clone)]
pub struct FetchedArticle {
    pub article: Article,
    pub day: Option<NaiveDate>,
}

impl FetchedArticle {
    fn from_raw(raw: RawArticle, day: Option<NaiveDate>) -> Self {
        Self {
            article: Article::from_raw(raw),
            day,
        }
    }
}

impl AsRef<Article> for FetchedArticle {
    fn as_ref(&self) -> &Article {
        &self.article
    }
}

/// Outcome counts for one range fetch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchReport {
    pub attempted: usize,
    pub failed: usize,
}

impl FetchReport {
    /// Some but not all upstream calls failed
    pub fn is_partial(&self) -> bool {
        self.failed > 0 && self.failed < self.attempted
    }
}

/// How a range will be covered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchPlan {
    Single(FetchRequest),
    PerDay(Vec<(NaiveDate, FetchRequest)>),
}

impl FetchPlan {
    /// Number of day buckets the resulting pool is split into
    pub fn days(&self) -> usize {
        match self {
            FetchPlan::Single(_) => 1,
            FetchPlan::PerDay(days) => days.len(),
        }
    }
}

/// Raw pool for a range
#[derive(Debug, Clone)]
pub struct RangeFetch {
    pub articles: Vec<FetchedArticle>,
    pub report: FetchReport,
    /// Day buckets in the pool (1 for a single query)
    pub days: usize,
}

pub struct RangeFetcher {
    source: Arc<dyn ArticleSource>,
    per_day_threshold_days: usize,
    max_range_days: usize,
    max_parallel_fetches: usize,
    max_page_size: usize,
    oversample_factor: usize,
}

impl RangeFetcher {
    pub fn new(source: Arc<dyn ArticleSource>, config: &PipelineConfig) -> Self {
        Self {
            source,
            per_day_threshold_days: config.per_day_threshold_days.max(1),
            max_range_days: config.max_range_days.max(1),
            max_parallel_fetches: config.max_parallel_fetches.max(1),
            max_page_size: config.max_page_size.max(1),
            oversample_factor: config.oversample_factor.max(1),
        }
    }

    /// Reject ranges whose per-day plan would exceed `max_range_days` calls
    pub fn check_range(&self, range: &DateRange) -> Result<(), QueryError> {
        match range.span_days() {
            Some(days) if days > self.max_range_days => Err(QueryError::RangeTooLong {
                days,
                max: self.max_range_days,
            }),
            _ => Ok(()),
        }
    }

    /// Decide the upstream queries for `target` final articles
    pub fn plan(&self, range: &DateRange, topic: Option<&str>, target: usize) -> FetchPlan {
        let pool_target = target.max(1) * self.oversample_factor;
        let query = topic.map(str::to_string);

        match range.span_days() {
            Some(span) if span >= self.per_day_threshold_days => {
                let per_day = (pool_target / span).clamp(1, self.max_page_size);
                FetchPlan::PerDay(
                    range
                        .days()
                        .into_iter()
                        .map(|day| (day, FetchRequest::for_day(query.clone(), day, per_day)))
                        .collect(),
                )
            }
            _ => FetchPlan::Single(FetchRequest {
                query,
                from: range.from_date(),
                to: range.to_date(),
                page_size: pool_target.min(self.max_page_size),
            }),
        }
    }

    /// Fetch the raw pool covering `range`
    #[instrument(skip(self))]
    pub async fn fetch(
        &self,
        range: &DateRange,
        topic: Option<&str>,
        target: usize,
    ) -> PipelineResult<RangeFetch> {
        self.check_range(range)?;
        match self.plan(range, topic, target) {
            FetchPlan::Single(request) => self.fetch_single(request).await,
            FetchPlan::PerDay(days) => self.fetch_per_day(days).await,
        }
    }

    async fn fetch_single(&self, request: FetchRequest) -> PipelineResult<RangeFetch> {
        debug!("Single upstream query: {:?}", request);
        let raw = self.source.fetch_articles(&request).await.map_err(|e| {
            warn!("Upstream fetch failed: {}", e);
            PipelineError::upstream(e.to_string())
        })?;

        info!("Fetched {} articles in one query", raw.len());
        Ok(RangeFetch {
            articles: raw
                .into_iter()
                .map(|r| FetchedArticle::from_raw(r, None))
                .collect(),
            report: FetchReport {
                attempted: 1,
                failed: 0,
            },
            days: 1,
        })
    }

    async fn fetch_per_day(
        &self,
        days: Vec<(NaiveDate, FetchRequest)>,
    ) -> PipelineResult<RangeFetch> {
        let attempted = days.len();
        info!(
            "Fetching {} days with up to {} concurrent queries",
            attempted, self.max_parallel_fetches
        );

        let mut results: Vec<(NaiveDate, Result<Vec<RawArticle>, NewsError>)> =
            stream::iter(days)
                .map(|(day, request)| {
                    let source = Arc::clone(&self.source);
                    async move { (day, source.fetch_articles(&request).await) }
                })
                .buffer_unordered(self.max_parallel_fetches)
                .collect()
                .await;

        // Completion order is arbitrary; rebuild the pool newest day first
        results.sort_by(|a, b| b.0.cmp(&a.0));

        let mut report = FetchReport {
            attempted,
            failed: 0,
        };
        let mut articles = Vec::new();
        let mut last_error = None;
        for (day, result) in results {
            match result {
                Ok(raw) => {
                    debug!("Day {} returned {} articles", day, raw.len());
                    articles.extend(raw.into_iter().map(|r| FetchedArticle::from_raw(r, Some(day))));
                }
                Err(e) => {
                    warn!("Fetch for {} failed: {}", day, e);
                    report.failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if report.failed == attempted {
            let reason = last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "empty range".to_string());
            return Err(PipelineError::upstream(format!(
                "all {} day queries failed: {}",
                attempted, reason
            )));
        }
        if report.is_partial() {
            warn!(
                "Partial upstream failure: {}/{} day queries failed",
                report.failed, report.attempted
            );
        }

        info!("Fetched {} articles across {} days", articles.len(), attempted);
        Ok(RangeFetch {
            articles,
            report,
            days: attempted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use parking_lot::Mutex;

    struct Recording {
        requests: Mutex<Vec<FetchRequest>>,
        fail_on: Option<NaiveDate>,
    }

    #[async_trait]
    impl ArticleSource for Recording {
        async fn fetch_articles(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, NewsError> {
            self.requests.lock().push(request.clone());
            if request.from.is_some() && request.from == self.fail_on {
                return Err(NewsError::RequestFailed("boom".to_string()));
            }
            let day = request.from.unwrap_or(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
            Ok(vec![RawArticle {
                title: format!("Story for {}", day),
                description: None,
                url: format!("https://news.test/{}", day),
                source: "Test".to_string(),
                published_at: Utc.from_utc_datetime(&day.and_hms_opt(9, 0, 0).unwrap()),
                image_url: None,
            }])
        }
    }

    fn fetcher(fail_on: Option<NaiveDate>) -> (Arc<Recording>, RangeFetcher) {
        let source = Arc::new(Recording {
            requests: Mutex::new(Vec::new()),
            fail_on,
        });
        let fetcher = RangeFetcher::new(source.clone(), &PipelineConfig::default());
        (source, fetcher)
    }

    fn range(from: u32, to: u32) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, from),
            NaiveDate::from_ymd_opt(2024, 1, to),
        )
        .unwrap()
    }

    #[test]
    fn test_short_range_is_single_query() {
        let (_, fetcher) = fetcher(None);
        match fetcher.plan(&range(1, 4), Some("rust"), 30) {
            FetchPlan::Single(request) => {
                assert_eq!(request.page_size, 60);
                assert_eq!(request.query.as_deref(), Some("rust"));
                assert_eq!(request.from, NaiveDate::from_ymd_opt(2024, 1, 1));
            }
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_unbounded_is_single_query_capped() {
        let (_, fetcher) = fetcher(None);
        match fetcher.plan(&DateRange::unbounded(), None, 300) {
            FetchPlan::Single(request) => assert_eq!(request.page_size, 100),
            other => panic!("unexpected plan {:?}", other),
        }
    }

    #[test]
    fn test_long_range_is_per_day() {
        let (_, fetcher) = fetcher(None);
        let plan = fetcher.plan(&range(1, 10), None, 20);
        assert_eq!(plan.days(), 10);
        if let FetchPlan::PerDay(days) = plan {
            assert!(days.iter().all(|(day, r)| r.from == Some(*day) && r.to == Some(*day)));
            assert!(days.iter().all(|(_, r)| r.page_size == 4));
        }
    }

    #[test]
    fn test_per_day_quota_minimum_one() {
        let (_, fetcher) = fetcher(None);
        if let FetchPlan::PerDay(days) = fetcher.plan(&range(1, 31), None, 1) {
            assert!(days.iter().all(|(_, r)| r.page_size == 1));
        } else {
            panic!("expected per-day plan");
        }
    }

    #[tokio::test]
    async fn test_partial_failure_is_tolerated() {
        let (source, fetcher) = fetcher(NaiveDate::from_ymd_opt(2024, 1, 3));
        let result = fetcher.fetch(&range(1, 6), None, 12).await.unwrap();

        assert_eq!(source.requests.lock().len(), 6);
        assert_eq!(result.report, FetchReport { attempted: 6, failed: 1 });
        assert_eq!(result.articles.len(), 5);
        assert_eq!(result.days, 6);
        // Newest day first
        assert_eq!(result.articles[0].day, NaiveDate::from_ymd_opt(2024, 1, 6));
    }

    #[tokio::test]
    async fn test_overlong_range_is_rejected_without_calls() {
        let (source, fetcher) = fetcher(None);
        let decades = DateRange::new(
            NaiveDate::from_ymd_opt(2000, 1, 1),
            NaiveDate::from_ymd_opt(2024, 1, 10),
        )
        .unwrap();

        let err = fetcher.fetch(&decades, None, 1).await.unwrap_err();
        assert!(matches!(
            err,
            PipelineError::InvalidQuery(QueryError::RangeTooLong { max: 31, .. })
        ));
        assert!(source.requests.lock().is_empty());

        assert!(fetcher.check_range(&range(1, 31)).is_ok());
        assert!(fetcher.check_range(&DateRange::unbounded()).is_ok());
    }

    #[tokio::test]
    async fn test_single_query_failure_is_unavailable() {
        let (_, fetcher) = fetcher(NaiveDate::from_ymd_opt(2024, 1, 1));
        let err = fetcher.fetch(&range(1, 2), None, 5).await.unwrap_err();
        assert!(matches!(err, PipelineError::UpstreamUnavailable(_)));
    }
}
