//! API route definitions

mod health;
mod news;
mod summarize;

use axum::{response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(news::routes())
        .merge(summarize::routes())
}

/// The complete application router
pub fn app(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/", get(banner))
        .merge(health::routes())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn banner() -> Json<Value> {
    Json(json!({
        "service": "Newsdesk API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /health",
            "GET /health/live",
            "GET /api/news",
            "POST /api/news/refresh",
            "GET /api/news/{id}",
            "POST /api/summarize/full",
            "POST /api/summarize/explain",
        ],
    }))
}
