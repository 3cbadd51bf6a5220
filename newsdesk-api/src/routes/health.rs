//! Health check endpoints

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    /// Retained result sets, fresh or stale
    cached_result_sets: usize,
    /// Articles across fresh result sets
    cached_articles: usize,
    /// Fresh result sets built while some day queries were failing
    partial_result_sets: usize,
    cached_summaries: usize,
}

/// Health check handler
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let stats = state.news.cache_stats();

    let response = HealthResponse {
        status: "healthy".to_string(),
        cached_result_sets: stats.entries,
        cached_articles: stats.fresh_articles,
        partial_result_sets: stats.partial_result_sets,
        cached_summaries: state.summaries.cached_summaries(),
    };

    (StatusCode::OK, Json(response))
}

/// Simple liveness check (always returns OK if server is running)
async fn liveness() -> &'static str {
    "OK"
}

/// Create health routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness))
}
