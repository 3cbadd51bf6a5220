//! Full-article summaries and text explanations

use serde::{Deserialize, Serialize};

/// Comprehensive summary of a scraped article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullSummary {
    pub summary: String,
    pub word_count: usize,
    pub url: String,
    #[serde(default)]
    pub cached: bool,
}

impl FullSummary {
    pub fn new(url: impl Into<String>, summary: String) -> Self {
        Self {
            word_count: summary.split_whitespace().count(),
            summary,
            url: url.into(),
            cached: false,
        }
    }
}

/// Explanation of a passage selected by the reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
    pub explanation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count() {
        let summary = FullSummary::new("https://example.com", "One two  three\nfour".to_string());
        assert_eq!(summary.word_count, 4);
        assert!(!summary.cached);
    }
}
