//! Background eviction of expired cache entries and idle rate-limit scopes

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::news_service::NewsService;
use crate::summary_service::SummaryService;

/// Run one sweep over both services
pub fn sweep_once(news: &NewsService, summaries: &SummaryService) {
    let feeds = news.sweep();
    let (summaries_removed, scopes) = summaries.sweep();
    if feeds + summaries_removed + scopes > 0 {
        info!(
            feeds,
            summaries = summaries_removed,
            scopes,
            "housekeeping evicted expired entries"
        );
    } else {
        debug!("housekeeping found nothing to evict");
    }
}

/// Spawn the periodic sweep. The task runs until aborted.
pub fn start_cleanup(
    news: Arc<NewsService>,
    summaries: Arc<SummaryService>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            sleep(every).await;
            sweep_once(&news, &summaries);
        }
    })
}
