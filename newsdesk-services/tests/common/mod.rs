//! In-memory collaborators for pipeline tests

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use parking_lot::Mutex;

use newsdesk_ai::{AiError, TextService};
use newsdesk_core::RawArticle;
use newsdesk_services::{
    CacheConfig, MockClock, NewsService, PipelineConfig, RateLimitConfig, SummaryService,
};
use newsdesk_sources::{ArticleSource, ContentScraper, FetchRequest, NewsError};

const WORDS: &[&str] = &[
    "chips", "cloud", "rockets", "phones", "robots", "browsers", "games", "batteries",
    "satellites", "compilers", "databases", "drones",
];

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

/// Day used for undated (single query) requests
pub fn headline_day() -> NaiveDate {
    date(2024, 1, 10)
}

/// News source that returns `page_size` distinct articles per request
#[derive(Default)]
pub struct FakeSource {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<FetchRequest>>,
    pub failing_days: Mutex<HashSet<NaiveDate>>,
    pub fail_all: AtomicBool,
    pub delay: Option<Duration>,
}

impl FakeSource {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_day(&self, day: NaiveDate) {
        self.failing_days.lock().insert(day);
    }

    pub fn set_down(&self, down: bool) {
        self.fail_all.store(down, Ordering::SeqCst);
    }
}

#[async_trait]
impl ArticleSource for FakeSource {
    async fn fetch_articles(&self, request: &FetchRequest) -> Result<Vec<RawArticle>, NewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let day = request.from.unwrap_or_else(headline_day);
        if self.fail_all.load(Ordering::SeqCst) || self.failing_days.lock().contains(&day) {
            return Err(NewsError::ApiError {
                status: 503,
                message: "unavailable".to_string(),
            });
        }

        let start = Utc.from_utc_datetime(&day.and_hms_opt(0, 0, 0).unwrap());
        Ok((0..request.page_size)
            .map(|i| RawArticle {
                title: format!("Story {} on {} {}", i, day.format("%b%d"), WORDS[i % WORDS.len()]),
                description: Some(format!("Details about {} for {}", WORDS[i % WORDS.len()], day)),
                url: format!("https://news.test/{}/{}", day, i),
                source: format!("Outlet {}", i % 3),
                published_at: start + chrono::Duration::minutes(i as i64),
                image_url: None,
            })
            .collect())
    }
}

/// Text service with deterministic output and switchable failures
#[derive(Default)]
pub struct FakeText {
    pub summarize_calls: AtomicUsize,
    pub full_calls: AtomicUsize,
    pub explain_calls: AtomicUsize,
    pub fail_summaries: AtomicBool,
    pub fail_topics: AtomicBool,
    pub last_full_title: Mutex<Option<String>>,
}

#[async_trait]
impl TextService for FakeText {
    async fn summarize(&self, title: &str, _description: &str) -> Result<String, AiError> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_summaries.load(Ordering::SeqCst) {
            return Err(AiError::api("model offline"));
        }
        Ok(format!("Summary of {}", title))
    }

    async fn extract_topics(&self, _titles: &[String]) -> Result<Vec<String>, AiError> {
        if self.fail_topics.load(Ordering::SeqCst) {
            return Err(AiError::api("model offline"));
        }
        Ok(vec!["Hardware".to_string(), "Space".to_string()])
    }

    async fn summarize_full(&self, title: &str, content: &str) -> Result<String, AiError> {
        self.full_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_full_title.lock() = Some(title.to_string());
        Ok(format!("Full summary of {} characters", content.len()))
    }

    async fn explain(&self, selected_text: &str, _context: &str) -> Result<String, AiError> {
        self.explain_calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("It means {}", selected_text))
    }
}

/// Scraper returning a fixed body, or failing for URLs containing "paywall"
#[derive(Default)]
pub struct FakeScraper {
    pub calls: AtomicUsize,
    pub delay: Option<Duration>,
}

#[async_trait]
impl ContentScraper for FakeScraper {
    async fn scrape_content(&self, url: &str) -> Result<String, NewsError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if url.contains("paywall") {
            return Err(NewsError::EmptyContent(url.to_string()));
        }
        Ok("Body text ".repeat(50))
    }
}

/// Services wired to fakes and a mock clock
pub struct Harness {
    pub clock: MockClock,
    pub source: Arc<FakeSource>,
    pub text: Arc<FakeText>,
    pub scraper: Arc<FakeScraper>,
    pub news: Arc<NewsService>,
    pub summaries: Arc<SummaryService>,
}

impl Harness {
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_parts(config, FakeSource::default(), FakeScraper::default())
    }

    pub fn with_parts(config: PipelineConfig, source: FakeSource, scraper: FakeScraper) -> Self {
        let clock = MockClock::new(at(2024, 1, 11));
        let source = Arc::new(source);
        let text = Arc::new(FakeText::default());
        let scraper = Arc::new(scraper);
        let cache_config = CacheConfig::default();

        let news = Arc::new(NewsService::new(
            source.clone(),
            text.clone(),
            config,
            &cache_config,
            Arc::new(clock.clone()),
        ));
        let summaries = Arc::new(SummaryService::new(
            scraper.clone(),
            text.clone(),
            news.clone(),
            &cache_config,
            &RateLimitConfig::default(),
            Arc::new(clock.clone()),
        ));

        Self {
            clock,
            source,
            text,
            scraper,
            news,
            summaries,
        }
    }
}
