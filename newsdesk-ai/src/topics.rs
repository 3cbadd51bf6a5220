//! Keyword topic extraction
//!
//! Counts how many headlines mention each topic from a static keyword table.
//! Used when the model cannot be reached.

use std::collections::HashMap;

use regex::Regex;

const MAX_TOPICS: usize = 8;

const TOPIC_KEYWORDS: &[(&str, &[&str])] = &[
    ("AI", &["ai", "artificial intelligence", "machine learning", "ml", "neural network", "deep learning", "gpt", "chatgpt", "llm", "openai", "claude", "gemini"]),
    ("Crypto", &["crypto", "cryptocurrency", "bitcoin", "ethereum", "blockchain", "nft", "web3", "defi", "btc", "eth"]),
    ("Hardware", &["hardware", "cpu", "gpu", "processor", "chip", "intel", "amd", "nvidia", "qualcomm", "apple silicon", "m1", "m2", "m3"]),
    ("Software", &["software", "app", "application", "os", "operating system", "windows", "linux", "macos", "ios", "android"]),
    ("Startup", &["startup", "unicorn", "ipo", "funding", "venture capital", "vc", "series a", "series b", "seed round"]),
    ("Gaming", &["gaming", "game", "playstation", "xbox", "nintendo", "steam", "esports", "gamer", "console"]),
    ("Security", &["security", "cybersecurity", "hack", "breach", "vulnerability", "malware", "ransomware", "phishing"]),
    ("Cloud", &["cloud", "aws", "azure", "gcp", "google cloud", "amazon web services", "serverless", "kubernetes"]),
    ("Mobile", &["mobile", "smartphone", "iphone", "android phone", "samsung", "apple", "ios", "android"]),
    ("Social Media", &["twitter", "facebook", "instagram", "tiktok", "linkedin", "social media", "meta"]),
    ("Electric Vehicles", &["ev", "electric vehicle", "tesla", "electric car", "battery", "charging"]),
    ("Space", &["space", "nasa", "spacex", "rocket", "satellite", "mars", "moon", "astronaut"]),
];

/// Keyword-table topic extractor
pub struct TopicExtractor {
    patterns: Vec<(&'static str, Regex)>,
}

impl TopicExtractor {
    pub fn new() -> Self {
        let patterns = TOPIC_KEYWORDS
            .iter()
            .filter_map(|(topic, keywords)| {
                let alternatives = keywords
                    .iter()
                    .map(|k| regex::escape(k))
                    .collect::<Vec<_>>()
                    .join("|");
                Regex::new(&format!(r"(?i)\b(?:{})\b", alternatives))
                    .ok()
                    .map(|re| (*topic, re))
            })
            .collect();
        Self { patterns }
    }

    /// Most frequent topics across `texts`, at most eight. A text counts once per topic.
    pub fn extract(&self, texts: &[String]) -> Vec<String> {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        for text in texts {
            for (topic, pattern) in &self.patterns {
                if pattern.is_match(text) {
                    *counts.entry(topic).or_default() += 1;
                }
            }
        }

        // Ties keep table order
        let mut ranked: Vec<(usize, &'static str, usize)> = self
            .patterns
            .iter()
            .enumerate()
            .filter_map(|(idx, (topic, _))| counts.get(topic).map(|c| (idx, *topic, *c)))
            .collect();
        ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

        ranked
            .into_iter()
            .take(MAX_TOPICS)
            .map(|(_, topic, _)| topic.to_string())
            .collect()
    }
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}
