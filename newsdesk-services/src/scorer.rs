//! Article scoring
//!
//! Score = recency + keyword bonus - diversity penalty, where
//! - recency decays exponentially with age (halving every `recency_half_life_hours`),
//! - each high-signal keyword present in the title adds `keyword`,
//! - each article already seen from the same source (in fetch order) subtracts
//!   `diversity_penalty`.
//!
//! The result depends only on the pool, its order, the weights and `now`.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use newsdesk_core::Article;

use crate::config::ScoringWeights;
use crate::range_fetcher::FetchedArticle;
use crate::similarity::normalize_title;

/// An article with its selection score
#[derive(Debug, Clone)]
pub struct ScoredArticle {
    pub article: Article,
    /// Day the article was fetched for, when the pool was fetched day by day
    pub day: Option<NaiveDate>,
    pub score: f64,
    /// Position in the fetched pool, used as the stable tie-breaker
    pub order: usize,
}

impl AsRef<Article> for ScoredArticle {
    fn as_ref(&self) -> &Article {
        &self.article
    }
}

pub struct Scorer {
    weights: ScoringWeights,
    keywords: HashSet<String>,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        let keywords = weights
            .keywords
            .iter()
            .map(|k| normalize_title(k))
            .filter(|k| !k.is_empty())
            .collect();
        Self { weights, keywords }
    }

    /// Score a pool in order. Earlier articles from a source make later ones cheaper.
    pub fn score(&self, pool: Vec<FetchedArticle>, now: DateTime<Utc>) -> Vec<ScoredArticle> {
        let mut per_source: HashMap<String, usize> = HashMap::new();

        pool.into_iter()
            .enumerate()
            .map(|(order, fetched)| {
                let seen = per_source
                    .entry(fetched.article.source.to_lowercase())
                    .or_insert(0);
                let score = self.recency(&fetched.article, now)
                    + self.keyword_bonus(&fetched.article)
                    - self.weights.diversity_penalty * *seen as f64;
                *seen += 1;

                ScoredArticle {
                    article: fetched.article,
                    day: fetched.day,
                    score,
                    order,
                }
            })
            .collect()
    }

    fn recency(&self, article: &Article, now: DateTime<Utc>) -> f64 {
        let age_hours = (now - article.published_at).num_seconds().max(0) as f64 / 3600.0;
        let half_life = self.weights.recency_half_life_hours.max(f64::EPSILON);
        self.weights.recency * 0.5_f64.powf(age_hours / half_life)
    }

    fn keyword_bonus(&self, article: &Article) -> f64 {
        let title = normalize_title(&article.title);
        let padded = format!(" {} ", title);
        let hits = self
            .keywords
            .iter()
            .filter(|k| padded.contains(&format!(" {} ", k)))
            .count();
        self.weights.keyword * hits as f64
    }
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}
