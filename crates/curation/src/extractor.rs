use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::retry::attempt_timeout;
use crate::text::normalize_whitespace;

const MAX_ATTEMPTS: u32 = 3;

const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                          (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Elements whose paragraphs are navigation chrome rather than article text
const SKIPPED_ANCESTORS: &[&str] = &["nav", "header", "footer", "aside", "script", "style"];

/// Capability: fetch the readable body text behind an article URL
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch_full_text(&self, url: &str) -> Option<String>;
}

pub struct ArticleFetcher {
    client: Client,
    request_timeout: Duration,
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2_u64.pow(attempt))
}

impl ArticleFetcher {
    /// `budget` bounds one whole fetch, retries included
    pub fn new(budget: Duration) -> Result<Self> {
        let request_timeout = attempt_timeout(budget, MAX_ATTEMPTS, backoff);
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            request_timeout,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn try_fetch_article(&self, url: &Url) -> Result<Option<String>> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .context("Failed to send HTTP request")?;

        let status = response.status();
        if matches!(
            status,
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND
        ) {
            debug!("{} returned {}, treating as unavailable", url, status);
            return Ok(None);
        }

        if !status.is_success() {
            anyhow::bail!("HTTP error: {}", status);
        }

        let html = response.text().await.context("Failed to read response body")?;
        Ok(extract_article_text(&html))
    }
}

#[async_trait]
impl ContentFetcher for ArticleFetcher {
    async fn fetch_full_text(&self, url: &str) -> Option<String> {
        let parsed = match Url::parse(url) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => parsed,
            _ => {
                debug!("Skipping fetch for non-web URL: {}", url);
                return None;
            }
        };

        for attempt in 0..MAX_ATTEMPTS {
            match self.try_fetch_article(&parsed).await {
                Ok(content) => return content,
                Err(e) => {
                    if attempt + 1 == MAX_ATTEMPTS {
                        warn!("Failed to fetch {}: {:#}", url, e);
                        return None;
                    }
                    debug!("Fetch attempt {} for {} failed: {:#}", attempt + 1, url, e);
                    tokio::time::sleep(backoff(attempt)).await;
                }
            }
        }

        None
    }
}

/// Pull the article paragraphs out of an HTML page.
///
/// Looks inside `<article>` or a content-like `div` when present, keeps
/// paragraphs over 60 characters and falls back to ones over 30.
pub fn extract_article_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    let root = first_match(&document, "article")
        .or_else(|| first_match(&document, "div[class*='content'], div[class*='article-body']"))
        .unwrap_or_else(|| document.root_element());

    let mut paragraphs = collect_paragraphs(root, 60);
    if paragraphs.is_empty() {
        paragraphs = collect_paragraphs(root, 30);
    }

    if paragraphs.is_empty() {
        None
    } else {
        Some(paragraphs.join(" "))
    }
}

fn first_match<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

fn collect_paragraphs(root: ElementRef<'_>, min_chars: usize) -> Vec<String> {
    let Ok(selector) = Selector::parse("p") else {
        return Vec::new();
    };

    root.select(&selector)
        .filter(|p| !inside_boilerplate(p))
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| text.chars().count() > min_chars)
        .collect()
}

fn inside_boilerplate(element: &ElementRef<'_>) -> bool {
    element.ancestors().any(|node| {
        node.value()
            .as_element()
            .is_some_and(|e| SKIPPED_ANCESTORS.contains(&e.name()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG_A: &str = "Charles Leclerc topped the opening morning of running in Bahrain with a late soft-tyre lap.";
    const LONG_B: &str = "Lewis Hamilton took over in the afternoon and focused on long runs with a heavy fuel load.";

    #[test]
    fn test_extracts_paragraphs_from_article() {
        let html = format!(
            "<html><body><nav><p>{}</p></nav><article><p>{}</p><p>Short.</p><p>{}</p></article></body></html>",
            "Home | News | Teams | Drivers | Schedule | Standings | Video | Subscribe now",
            LONG_A,
            LONG_B
        );
        let text = extract_article_text(&html).unwrap();
        assert_eq!(text, format!("{} {}", LONG_A, LONG_B));
    }

    #[test]
    fn test_prefers_content_div_over_page_paragraphs() {
        let html = format!(
            "<html><body><p>{}</p><div class=\"post-content\"><p>{}</p></div></body></html>",
            LONG_B, LONG_A
        );
        assert_eq!(extract_article_text(&html).unwrap(), LONG_A);
    }

    #[test]
    fn test_skips_footer_paragraphs_without_container() {
        let html = format!(
            "<html><body><p>{}</p><footer><p>{}</p></footer></body></html>",
            LONG_A, LONG_B
        );
        assert_eq!(extract_article_text(&html).unwrap(), LONG_A);
    }

    #[test]
    fn test_falls_back_to_shorter_paragraphs() {
        let html = "<article><p>Ferrari confirm their test dates for Bahrain.</p></article>";
        assert_eq!(
            extract_article_text(html).unwrap(),
            "Ferrari confirm their test dates for Bahrain."
        );
    }

    #[test]
    fn test_no_paragraphs_is_unavailable() {
        assert!(extract_article_text("<html><body><div>nothing</div></body></html>").is_none());
    }

    #[test]
    fn test_request_timeout_leaves_room_for_retries() {
        let budget = Duration::from_secs(20);
        let fetcher = ArticleFetcher::new(budget).unwrap();

        let spent = fetcher.request_timeout() * MAX_ATTEMPTS + backoff(0) + backoff(1);
        assert!(fetcher.request_timeout() < budget);
        assert!(spent <= budget);
    }

    #[tokio::test]
    async fn test_non_web_url_is_unavailable() {
        let fetcher = ArticleFetcher::new(Duration::from_secs(1)).unwrap();
        assert!(fetcher.fetch_full_text("not a url").await.is_none());
        assert!(fetcher.fetch_full_text("ftp://example.com/file").await.is_none());
    }
}
