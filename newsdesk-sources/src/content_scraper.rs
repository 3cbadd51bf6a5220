//! Article page scraper
//!
//! Fetches an article page and extracts its main text for full summaries.
//! Pages behind paywalls or bot protection usually fail with 403 and are
//! reported as scrape failures.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument, warn};

use crate::error::NewsError;
use crate::source::ContentScraper;

/// Minimum extracted length for the text to count as an article
const MIN_CONTENT_CHARS: usize = 100;

/// Extracted text is cut at this many characters
const MAX_CONTENT_CHARS: usize = 5000;

/// Elements whose text never belongs to the article body
const EXCLUDED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "form"];

/// Class fragments commonly used for article bodies
const CONTENT_CLASSES: &[&str] = &["article-content", "post-content", "entry-content", "story-body"];

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Scrapes article pages over HTTP
#[derive(Clone)]
pub struct HtmlScraper {
    client: Client,
}

impl HtmlScraper {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .user_agent(BROWSER_USER_AGENT)
                .redirect(reqwest::redirect::Policy::limited(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }
}

impl Default for HtmlScraper {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentScraper for HtmlScraper {
    #[instrument(skip(self))]
    async fn scrape_content(&self, url: &str) -> Result<String, NewsError> {
        let parsed = url::Url::parse(url)
            .map_err(|e| NewsError::ScrapeFailed(format!("Invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NewsError::ScrapeFailed(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!("Access denied (403) for {} - likely paywall or bot protection", url);
        }
        if !status.is_success() {
            return Err(NewsError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to fetch {}", url),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| NewsError::RequestFailed(e.to_string()))?;

        let text = extract_article_text(&html).ok_or_else(|| NewsError::EmptyContent(url.to_string()))?;
        debug!("Extracted {} chars from {}", text.len(), url);
        Ok(text)
    }
}

/// Extract the main article text from an HTML document.
///
/// Tries `<article>`, then `<main>`, then common content classes, then every
/// `<p>`. Returns `None` when the result is shorter than 100 characters.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let mut raw = first_match_text(&document, "article")
        .or_else(|| first_match_text(&document, "main"))
        .or_else(|| {
            CONTENT_CLASSES.iter().find_map(|class| {
                first_match_text(&document, &format!("[class*=\"{}\"]", class))
            })
        });

    if raw.as_deref().map(str::trim).unwrap_or_default().is_empty() {
        raw = Selector::parse("p").ok().map(|selector| {
            document
                .select(&selector)
                .map(visible_text)
                .collect::<Vec<_>>()
                .join(" ")
        });
    }

    let text = collapse_whitespace(&raw?);
    if text.chars().count() < MIN_CONTENT_CHARS {
        return None;
    }

    Some(truncate_chars(&text, MAX_CONTENT_CHARS))
}

fn first_match_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document.select(&selector).next().map(visible_text)
}

/// Text under `element`, skipping anything nested in an excluded tag
fn visible_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .map(|e| EXCLUDED_TAGS.contains(&e.name()))
                .unwrap_or(false)
        });
        if !hidden {
            out.push_str(text);
            out.push(' ');
        }
    }
    out
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_sentence() -> String {
        "The new processor doubles battery life while running cooler than last year's model. "
            .repeat(3)
    }

    #[test]
    fn test_prefers_article_and_skips_scripts() {
        let html = format!(
            "<html><body><nav>Home | World</nav><article><script>var x = 1;</script>\
             <p>{}</p><aside>Subscribe now</aside></article></body></html>",
            long_sentence()
        );
        let text = extract_article_text(&html).unwrap();
        assert!(text.starts_with("The new processor"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Subscribe"));
        assert!(!text.contains("Home"));
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let html = format!(
            "<html><body><div><p>{}</p><p>Second   paragraph.</p></div></body></html>",
            long_sentence()
        );
        let text = extract_article_text(&html).unwrap();
        assert!(text.ends_with("Second paragraph."));
    }

    #[test]
    fn test_uses_content_class() {
        let html = format!(
            "<html><body><div class=\"main entry-content\">{}</div></body></html>",
            long_sentence()
        );
        assert!(extract_article_text(&html).is_some());
    }

    #[test]
    fn test_rejects_short_content() {
        let html = "<html><body><article><p>Too short.</p></article></body></html>";
        assert_eq!(extract_article_text(html), None);
    }

    #[test]
    fn test_truncates_long_content() {
        let html = format!("<article><p>{}</p></article>", "word ".repeat(2000));
        let text = extract_article_text(&html).unwrap();
        assert!(text.ends_with("..."));
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS + 3);
    }
}
