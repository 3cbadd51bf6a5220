//! Full-article summaries and passage explanations

use axum::{extract::State, routing::post, Json, Router};
use newsdesk_core::{Explanation, FullSummary};
use serde::Deserialize;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FullSummaryRequest {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct ExplainRequest {
    pub selected_text: String,
    #[serde(default)]
    pub context: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/summarize/full", post(full_summary))
        .route("/summarize/explain", post(explain))
}

/// POST /api/summarize/full
async fn full_summary(
    State(state): State<AppState>,
    Json(request): Json<FullSummaryRequest>,
) -> ApiResult<Json<FullSummary>> {
    Ok(Json(state.summaries.full_summary(&request.url).await?))
}

/// POST /api/summarize/explain
async fn explain(
    State(state): State<AppState>,
    Json(request): Json<ExplainRequest>,
) -> ApiResult<Json<Explanation>> {
    let explanation = state
        .summaries
        .explain(&request.selected_text, request.context.as_deref())
        .await?;
    Ok(Json(explanation))
}
