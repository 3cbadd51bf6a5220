//! Newsdesk API Server
//!
//! HTTP API server that serves deduplicated, fairly sampled and summarized
//! technology news from NewsAPI.

mod config;
mod error;
mod routes;

use axum::http::{header, HeaderValue, Method};
use newsdesk_ai::OpenAIClient;
use newsdesk_services::{
    housekeeping, NewsService, PipelineConfig, SharedClock, SummaryService, SystemClock,
};
use newsdesk_sources::{HtmlScraper, NewsApiClient};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub news: Arc<NewsService>,
    pub summaries: Arc<SummaryService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env.local overrides .env; neither has to exist
    for file in [".env.local", ".env"] {
        if let Err(e) = dotenvy::from_filename(file) {
            if !matches!(e, dotenvy::Error::Io(_)) {
                eprintln!("Warning: Failed to load {}: {}", file, e);
            }
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,newsdesk_api=debug")),
        )
        .init();

    info!("Starting Newsdesk API");

    let config = AppConfig::from_env()?;
    let cache_config = config.cache_config();
    let clock: SharedClock = Arc::new(SystemClock);

    let source = Arc::new(NewsApiClient::new(config.news_api_key.clone()));
    let text = Arc::new(OpenAIClient::new(&config.openai_api_key).with_model(&config.openai_model));
    info!("Text service using model {}", text.model());

    let news = Arc::new(NewsService::new(
        source,
        text.clone(),
        PipelineConfig::default(),
        &cache_config,
        Arc::clone(&clock),
    ));
    let summaries = Arc::new(SummaryService::new(
        Arc::new(HtmlScraper::new()),
        text,
        Arc::clone(&news),
        &cache_config,
        &config.rate_limit_config(),
        clock,
    ));

    // Evict expired result sets, summaries and idle rate-limit scopes
    housekeeping::start_cleanup(
        Arc::clone(&news),
        Arc::clone(&summaries),
        cache_config.sweep_interval,
    );

    let state = AppState { news, summaries };
    let app = routes::app(state, cors_layer(&config.allowed_origins));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS for the frontend. No configured origins means any origin.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin {:?}", origin);
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(allowed))
    }
}
