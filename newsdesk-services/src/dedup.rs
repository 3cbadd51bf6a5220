//! Exact and near-duplicate removal
//!
//! Two passes over the pool. The first drops repeated URLs (normalized the
//! same way article ids are derived). The second compares each normalized
//! title against the titles already accepted and drops it when the
//! similarity reaches the threshold. The earlier occurrence always wins and
//! relative order is preserved, so running the deduplicator on its own
//! output changes nothing.

use std::collections::HashSet;

use newsdesk_core::{normalize_url, Article};
use tracing::debug;

use crate::similarity::{normalize_title, SimilarityKind, TitleSimilarity};

pub struct Deduplicator {
    measure: Box<dyn TitleSimilarity>,
    threshold: f64,
}

impl Deduplicator {
    pub fn new(kind: SimilarityKind, threshold: f64) -> Self {
        Self::with_measure(kind.measure(), threshold)
    }

    pub fn with_measure(measure: Box<dyn TitleSimilarity>, threshold: f64) -> Self {
        Self {
            measure,
            threshold: threshold.clamp(0.0, 1.0),
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether two titles count as the same story
    pub fn is_near_duplicate(&self, a: &str, b: &str) -> bool {
        self.measure
            .similarity(&normalize_title(a), &normalize_title(b))
            >= self.threshold
    }

    /// Remove duplicates from `items`, keeping first occurrences in order
    pub fn dedup<T: AsRef<Article>>(&self, items: Vec<T>) -> Vec<T> {
        let input_len = items.len();

        let mut seen_urls = HashSet::new();
        let unique_urls: Vec<T> = items
            .into_iter()
            .filter(|item| seen_urls.insert(normalize_url(&item.as_ref().url)))
            .collect();
        let url_dropped = input_len - unique_urls.len();

        let mut accepted_titles: Vec<String> = Vec::with_capacity(unique_urls.len());
        let mut output = Vec::with_capacity(unique_urls.len());
        for item in unique_urls {
            let title = normalize_title(&item.as_ref().title);
            let duplicate = accepted_titles
                .iter()
                .any(|kept| self.measure.similarity(&title, kept) >= self.threshold);
            if duplicate {
                continue;
            }
            accepted_titles.push(title);
            output.push(item);
        }

        debug!(
            "Deduplicated {} -> {} articles ({} by url, {} by title)",
            input_len,
            output.len(),
            url_dropped,
            input_len - url_dropped - output.len()
        );
        output
    }
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(SimilarityKind::default(), 0.85)
    }
}
