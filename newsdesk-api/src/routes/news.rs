//! News endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use newsdesk_core::{Article, DateRange, NewsPage, NewsQuery};
use newsdesk_services::CacheKey;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

const DEFAULT_LIMIT: usize = 10;

/// Query parameters for listing news
#[derive(Debug, Default, Deserialize)]
pub struct NewsParams {
    /// Articles per page
    pub limit: Option<usize>,
    /// 1-based page number
    pub page: Option<usize>,
    /// Window start, YYYY-MM-DD
    pub from_date: Option<String>,
    /// Window end, YYYY-MM-DD
    pub to_date: Option<String>,
    pub topic: Option<String>,
    /// Rebuild the result set even if cached
    #[serde(default)]
    pub force_refresh: bool,
}

impl NewsParams {
    fn into_query(self) -> ApiResult<NewsQuery> {
        let range = DateRange::parse(self.from_date.as_deref(), self.to_date.as_deref())?;
        Ok(NewsQuery::new(
            self.limit.unwrap_or(DEFAULT_LIMIT),
            self.page.unwrap_or(1),
            range,
            self.topic,
            self.force_refresh,
        )?)
    }
}

/// Window and topic naming a cached result set
#[derive(Debug, Deserialize)]
pub struct RefreshParams {
    pub from_date: Option<String>,
    pub to_date: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Serialize)]
struct RefreshResponse {
    key: String,
    invalidated: bool,
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/news", get(get_news))
        .route("/news/refresh", post(refresh_news))
        .route("/news/{id}", get(get_article))
}

/// GET /api/news - One page of the cached (or freshly built) result set
async fn get_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> ApiResult<Json<NewsPage>> {
    let query = params.into_query()?;
    let page = state.news.query(&query).await?;
    Ok(Json(page))
}

/// POST /api/news/refresh - Drop the result set for a window and topic
async fn refresh_news(
    State(state): State<AppState>,
    Query(params): Query<RefreshParams>,
) -> ApiResult<Json<RefreshResponse>> {
    let range = DateRange::parse(params.from_date.as_deref(), params.to_date.as_deref())?;
    let key = CacheKey::new(range, params.topic.as_deref());
    let invalidated = state.news.invalidate(range, params.topic.as_deref());
    info!("Refresh requested for {} (invalidated: {})", key, invalidated);

    Ok(Json(RefreshResponse {
        key: key.to_string(),
        invalidated,
    }))
}

/// GET /api/news/{id} - Look an article up across fresh result sets
async fn get_article(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Article>> {
    state
        .news
        .find_article(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = NewsParams::default().into_query().unwrap();
        assert_eq!(query.limit(), DEFAULT_LIMIT);
        assert_eq!(query.page(), 1);
        assert!(query.range().is_unbounded());
        assert!(!query.force_refresh());
    }

    #[test]
    fn test_invalid_params_are_query_errors() {
        let params = NewsParams {
            from_date: Some("2024-02-01".to_string()),
            to_date: Some("2024-01-01".to_string()),
            ..NewsParams::default()
        };
        assert!(matches!(params.into_query(), Err(ApiError::Query(_))));

        let params = NewsParams {
            limit: Some(0),
            ..NewsParams::default()
        };
        assert!(matches!(params.into_query(), Err(ApiError::Query(_))));
    }
}
