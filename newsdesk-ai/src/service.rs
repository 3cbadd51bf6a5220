//! The text-service seam used by the pipeline

use async_trait::async_trait;

use crate::error::AiError;

/// External AI text service. Every call is latency-bearing and fallible.
#[async_trait]
pub trait TextService: Send + Sync {
    /// Two or three sentence summary from a headline and its excerpt
    async fn summarize(&self, title: &str, description: &str) -> Result<String, AiError>;

    /// Trending topic names for a set of headlines
    async fn extract_topics(&self, titles: &[String]) -> Result<Vec<String>, AiError>;

    /// Comprehensive summary of a scraped article body
    async fn summarize_full(&self, title: &str, content: &str) -> Result<String, AiError>;

    /// Plain-language explanation of a selected passage
    async fn explain(&self, selected_text: &str, context: &str) -> Result<String, AiError>;
}
