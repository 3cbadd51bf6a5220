//! Fair sampling across days
//!
//! Articles are bucketed by the day they were fetched for (a pool fetched in
//! one query is a single bucket). Each bucket is ranked by score and the
//! sampler takes one article per bucket per round until it has `target`
//! articles or every bucket is exhausted or capped. Within a round the
//! bucket heads are taken best score first, so a partial last round keeps
//! the strongest candidates.
//!
//! For a pool spanning `days` days no bucket contributes more than
//! `ceil(target / days) + slack` articles. The same ceiling is applied again
//! per served page by [`Sampler::page_order`], with the page size as target.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use chrono::NaiveDate;
use tracing::debug;

use crate::scorer::ScoredArticle;

pub struct Sampler {
    slack: usize,
}

impl Sampler {
    pub fn new(slack: usize) -> Self {
        Self { slack }
    }

    /// Per-day ceiling for a `days`-day range, `None` when the pool is one bucket
    pub fn ceiling(&self, target: usize, days: usize) -> Option<usize> {
        if days <= 1 {
            return None;
        }
        Some(target.div_ceil(days) + self.slack)
    }

    /// Select up to `target` articles, at most the per-day ceiling from each day.
    ///
    /// The returned list is ordered newest first; equal timestamps fall back
    /// to score and then fetch order.
    pub fn sample(
        &self,
        pool: Vec<ScoredArticle>,
        target: usize,
        days: usize,
    ) -> Vec<ScoredArticle> {
        let ceiling = self.ceiling(target, days).unwrap_or(target);

        let mut buckets: BTreeMap<Option<NaiveDate>, Vec<ScoredArticle>> = BTreeMap::new();
        for article in pool {
            buckets.entry(article.day).or_default().push(article);
        }

        let mut queues: Vec<(usize, VecDeque<ScoredArticle>)> = buckets
            .into_values()
            .map(|mut bucket| {
                bucket.sort_by(by_score);
                (0, VecDeque::from(bucket))
            })
            .collect();

        let mut selected = Vec::with_capacity(target);
        while selected.len() < target {
            let mut heads: Vec<usize> = queues
                .iter()
                .enumerate()
                .filter(|(_, (taken, queue))| *taken < ceiling && !queue.is_empty())
                .map(|(idx, _)| idx)
                .collect();
            if heads.is_empty() {
                break;
            }

            heads.sort_by(|a, b| match (queues[*a].1.front(), queues[*b].1.front()) {
                (Some(x), Some(y)) => by_score(x, y),
                _ => Ordering::Equal,
            });

            for idx in heads {
                if selected.len() >= target {
                    break;
                }
                let (taken, queue) = &mut queues[idx];
                if let Some(article) = queue.pop_front() {
                    *taken += 1;
                    selected.push(article);
                }
            }
        }

        debug!(
            "Sampled {} articles (target {}, {} buckets, ceiling {})",
            selected.len(),
            target,
            queues.len(),
            ceiling
        );

        selected.sort_by(|a, b| {
            b.article
                .published_at
                .cmp(&a.article.published_at)
                .then_with(|| by_score(a, b))
        });
        selected
    }

    /// Serving order for a sampled list read `page_size` at a time.
    ///
    /// `days` holds the bucket of each article in presentation order. The
    /// result is a permutation of its indices in which every page takes at
    /// most `ceil(page_size / span_days) + slack` articles per day, round
    /// robin from the newest day, and keeps presentation order inside the
    /// page. A page the remaining days cannot fill under the ceiling is
    /// topped up without it, so pages stay full.
    pub fn page_order(
        &self,
        days: &[Option<NaiveDate>],
        page_size: usize,
        span_days: usize,
    ) -> Vec<usize> {
        let page_size = page_size.max(1);
        let Some(ceiling) = self.ceiling(page_size, span_days) else {
            return (0..days.len()).collect();
        };

        let mut buckets: BTreeMap<Option<NaiveDate>, VecDeque<usize>> = BTreeMap::new();
        for (idx, day) in days.iter().enumerate() {
            buckets.entry(*day).or_default().push_back(idx);
        }
        let mut queues: Vec<VecDeque<usize>> = buckets.into_values().rev().collect();

        let mut order = Vec::with_capacity(days.len());
        while order.len() < days.len() {
            let mut page = Vec::with_capacity(page_size);
            let mut taken = vec![0usize; queues.len()];
            let mut capped = true;

            while page.len() < page_size {
                let before = page.len();
                for (bucket, queue) in queues.iter_mut().enumerate() {
                    if page.len() >= page_size {
                        break;
                    }
                    if capped && taken[bucket] >= ceiling {
                        continue;
                    }
                    if let Some(idx) = queue.pop_front() {
                        taken[bucket] += 1;
                        page.push(idx);
                    }
                }
                if page.len() == before {
                    if !capped {
                        break;
                    }
                    capped = false;
                }
            }

            page.sort_unstable();
            order.extend(page);
        }
        order
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Score descending, then fetch order ascending
fn by_score(a: &ScoredArticle, b: &ScoredArticle) -> Ordering {
    b.score
        .partial_cmp(&a.score)
        .unwrap_or(Ordering::Equal)
        .then(a.order.cmp(&b.order))
}
