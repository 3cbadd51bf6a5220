//! Environment configuration for the server

use std::time::Duration;

use anyhow::Context;
use newsdesk_services::{CacheConfig, RateLimitConfig};

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub news_api_key: String,
    pub openai_api_key: String,
    pub openai_model: String,
    /// Result-set TTL in seconds
    pub cache_ttl: u64,
    /// Full-summary TTL in seconds
    pub full_summary_ttl: u64,
    pub rate_limit_count: usize,
    /// Rate-limit window in seconds
    pub rate_limit_window: u64,
    pub port: u16,
    /// Empty means any origin
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let news_api_key = std::env::var("NEWS_API_KEY").context("NEWS_API_KEY must be set")?;
        let openai_api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

        Ok(Self {
            news_api_key,
            openai_api_key,
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            cache_ttl: env_or("CACHE_TTL", 900),
            full_summary_ttl: env_or("FULL_SUMMARY_TTL", 86_400),
            rate_limit_count: env_or("RATE_LIMIT_COUNT", 10),
            rate_limit_window: env_or("RATE_LIMIT_WINDOW", 60),
            port: env_or("SERVER_PORT", DEFAULT_PORT),
            allowed_origins: std::env::var("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig {
            feed_ttl: Duration::from_secs(self.cache_ttl),
            full_summary_ttl: Duration::from_secs(self.full_summary_ttl),
            ..CacheConfig::default()
        }
    }

    pub fn rate_limit_config(&self) -> RateLimitConfig {
        RateLimitConfig {
            quota: self.rate_limit_count,
            window: Duration::from_secs(self.rate_limit_window),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://localhost:3000, https://news.example.com ,,"),
            vec!["http://localhost:3000", "https://news.example.com"]
        );
        assert!(parse_origins("").is_empty());
    }

    #[test]
    fn test_derived_configs() {
        let config = AppConfig {
            news_api_key: "n".to_string(),
            openai_api_key: "o".to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            cache_ttl: 60,
            full_summary_ttl: 120,
            rate_limit_count: 3,
            rate_limit_window: 30,
            port: DEFAULT_PORT,
            allowed_origins: Vec::new(),
        };
        assert_eq!(config.cache_config().feed_ttl, Duration::from_secs(60));
        assert_eq!(config.cache_config().stale_retention, Duration::from_secs(3600));
        assert_eq!(config.rate_limit_config().quota, 3);
    }
}
