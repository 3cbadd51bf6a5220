//! HTTP error mapping

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use newsdesk_core::QueryError;
use newsdesk_services::PipelineError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("{0}")]
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Query(_) | ApiError::Pipeline(PipelineError::InvalidQuery(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Pipeline(PipelineError::ContentUnavailable { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::RateLimitExceeded { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Pipeline(PipelineError::UpstreamUnavailable(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Pipeline(PipelineError::Ai(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        if status.is_server_error() || status == StatusCode::BAD_GATEWAY {
            error!("Request failed: {}", self);
        }

        let retry_after = match &self {
            ApiError::Pipeline(PipelineError::RateLimitExceeded {
                retry_after_secs, ..
            }) => HeaderValue::from_str(&retry_after_secs.to_string()).ok(),
            _ => None,
        };

        let mut response = (status, Json(json!({ "error": self.to_string() }))).into_response();
        if let Some(value) = retry_after {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}
