//! Error types for the pipeline services

use newsdesk_ai::AiError;
use newsdesk_core::QueryError;
use thiserror::Error;

/// Failures surfaced by the news and summary services
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The query was rejected before any fetch (bad range, limit, page or input)
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),

    /// The single upstream fetch, or every per-day fetch, failed
    #[error("News source unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The caller exhausted the quota for this scope
    #[error("Rate limit exceeded for {scope}. Please try again in {retry_after_secs}s")]
    RateLimitExceeded { scope: String, retry_after_secs: u64 },

    /// The article page could not be scraped into usable text
    #[error("Could not extract content from {url}: {reason}")]
    ContentUnavailable { url: String, reason: String },

    /// The text service failed on a call without a fallback
    #[error("Text service error: {0}")]
    Ai(#[from] AiError),
}

impl PipelineError {
    pub fn upstream(msg: impl Into<String>) -> Self {
        PipelineError::UpstreamUnavailable(msg.into())
    }

    pub fn content(url: impl Into<String>, reason: impl ToString) -> Self {
        PipelineError::ContentUnavailable {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;
