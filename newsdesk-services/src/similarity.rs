//! Title similarity measures used for near-duplicate detection

use std::collections::HashSet;

/// Selectable similarity algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimilarityKind {
    /// Jaccard overlap of the word sets
    #[default]
    TokenJaccard,
    /// `1 - levenshtein / max_len` over characters
    EditRatio,
}

impl SimilarityKind {
    pub fn measure(self) -> Box<dyn TitleSimilarity> {
        match self {
            SimilarityKind::TokenJaccard => Box::new(TokenJaccard),
            SimilarityKind::EditRatio => Box::new(EditRatio),
        }
    }
}

/// A symmetric similarity score in `0.0..=1.0` over already-normalized titles
pub trait TitleSimilarity: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Lowercase, replace punctuation with spaces and collapse whitespace
pub fn normalize_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokenJaccard;

impl TitleSimilarity for TokenJaccard {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left: HashSet<&str> = a.split_whitespace().collect();
        let right: HashSet<&str> = b.split_whitespace().collect();

        if left.is_empty() && right.is_empty() {
            return 1.0;
        }

        let intersection = left.intersection(&right).count();
        let union = left.union(&right).count();
        intersection as f64 / union as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EditRatio;

impl TitleSimilarity for EditRatio {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left: Vec<char> = a.chars().collect();
        let right: Vec<char> = b.chars().collect();
        let longest = left.len().max(right.len());
        if longest == 0 {
            return 1.0;
        }
        1.0 - levenshtein(&left, &right) as f64 / longest as f64
    }
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(
            normalize_title("  Apple's New iPhone:   Hands-On!  "),
            "apple s new iphone hands on"
        );
        assert_eq!(normalize_title("!!!"), "");
    }

    #[test]
    fn test_token_jaccard() {
        let measure = TokenJaccard;
        assert_eq!(measure.similarity("a b c", "c b a"), 1.0);
        assert_eq!(measure.similarity("a b", "c d"), 0.0);
        assert!((measure.similarity("a b c d", "a b c e") - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_edit_ratio() {
        let measure = EditRatio;
        assert_eq!(measure.similarity("kitten", "kitten"), 1.0);
        assert!((measure.similarity("kitten", "sitting") - (1.0 - 3.0 / 7.0)).abs() < 1e-9);
        assert_eq!(measure.similarity("", ""), 1.0);
    }

    #[test]
    fn test_measures_are_symmetric() {
        let pairs = [
            ("nvidia unveils new gpu", "nvidia unveils a new gpu today"),
            ("spacex launch delayed", "launch of spacex rocket delayed again"),
        ];
        for kind in [SimilarityKind::TokenJaccard, SimilarityKind::EditRatio] {
            let measure = kind.measure();
            for (a, b) in pairs {
                assert_eq!(measure.similarity(a, b), measure.similarity(b, a));
            }
        }
    }
}
