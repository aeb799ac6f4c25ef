use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::SummaryConfig;
use crate::extractive::ExtractiveSummarizer;
use crate::extractor::ContentFetcher;
use crate::models::SectionBundle;
use crate::scrub::clean_bot_messages;
use crate::summarizer::Generator;
use crate::text::truncate_chars;

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_SUMMARY_TIMEOUT: Duration = Duration::from_secs(60);

/// Produces a bounded-length description for one article.
///
/// Stages run in order and each one degrades to the next: full-text fetch,
/// length gate, generative provider, extractive selection, anti-bot scrub,
/// final length cap. The chain never fails; at worst it hands back the
/// summary it was given.
pub struct SummaryChain {
    config: SummaryConfig,
    fetcher: Option<Arc<dyn ContentFetcher>>,
    generator: Generator,
    fetch_timeout: Duration,
    summary_timeout: Duration,
}

impl SummaryChain {
    pub fn new(config: SummaryConfig) -> Self {
        Self {
            config,
            fetcher: None,
            generator: Generator::NotConfigured,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            summary_timeout: DEFAULT_SUMMARY_TIMEOUT,
        }
    }

    pub fn with_fetcher(mut self, fetcher: impl ContentFetcher + 'static) -> Self {
        self.fetcher = Some(Arc::new(fetcher));
        self
    }

    pub fn with_generator(mut self, generator: Generator) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_timeouts(mut self, fetch: Duration, summary: Duration) -> Self {
        self.fetch_timeout = fetch;
        self.summary_timeout = summary;
        self
    }

    pub async fn summarize_article(
        &self,
        title: &str,
        summary: &str,
        full_text: Option<&str>,
        url: Option<&str>,
    ) -> String {
        let mut full_text = full_text
            .filter(|t| !t.trim().is_empty())
            .map(str::to_string);

        if full_text.is_none() {
            if let (Some(url), Some(fetcher)) = (url.filter(|u| !u.is_empty()), &self.fetcher) {
                info!("Fetching full text for summarization: {}...", truncate_chars(title, 30));
                full_text = self.fetch(fetcher.as_ref(), url).await;
            }
        }

        let text = full_text.as_deref().unwrap_or(summary);
        if text.chars().count() < self.config.min_length {
            return summary.to_string();
        }

        if let Some(generated) = self.generate(text).await {
            return generated;
        }

        debug!("Falling back to extractive summarization");
        let extractive = ExtractiveSummarizer::new(&self.config);
        let mut result = extractive.summarize(text, extractive.target_sentences(text));

        result = clean_bot_messages(&self.config, &result);

        if result.chars().count() > self.config.max_length {
            result = extractive.summarize(&result, 2);
        }
        if result.chars().count() > self.config.max_length {
            result = cut_at_word(&result, self.config.max_length);
        }

        if result.trim().is_empty() {
            return summary.to_string();
        }
        result
    }

    /// Run the chain over every selected article, replacing summaries in place.
    /// Returns how many were replaced.
    pub async fn summarize_bundle(&self, bundle: &mut SectionBundle) -> usize {
        let mut replaced = 0;

        for candidate in bundle.iter_mut() {
            let url = Some(candidate.url.as_str()).filter(|u| !u.is_empty());
            let summary = self
                .summarize_article(&candidate.title, &candidate.summary, None, url)
                .await;

            if !summary.is_empty() && summary != candidate.summary {
                info!("Summarized: {}...", truncate_chars(&candidate.title, 50));
                candidate.summary = summary;
                replaced += 1;
            }
        }

        replaced
    }

    async fn fetch(&self, fetcher: &dyn ContentFetcher, url: &str) -> Option<String> {
        match timeout(self.fetch_timeout, fetcher.fetch_full_text(url)).await {
            Ok(Some(text)) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                debug!("No full text available for {}", url);
                None
            }
            Err(_) => {
                warn!("Timed out fetching {} after {:?}", url, self.fetch_timeout);
                None
            }
        }
    }

    async fn generate(&self, text: &str) -> Option<String> {
        let Generator::Configured(summarizer) = &self.generator else {
            return None;
        };

        match timeout(self.summary_timeout, summarizer.summarize(text)).await {
            Ok(Ok(Some(generated))) if !generated.trim().is_empty() => {
                Some(generated.trim().to_string())
            }
            Ok(Ok(_)) => {
                debug!("{} returned no summary", summarizer.name());
                None
            }
            Ok(Err(e)) => {
                warn!("{} summarization failed: {:#}", summarizer.name(), e);
                None
            }
            Err(_) => {
                warn!(
                    "{} summarization timed out after {:?}",
                    summarizer.name(),
                    self.summary_timeout
                );
                None
            }
        }
    }
}

fn cut_at_word(text: &str, max_chars: usize) -> String {
    let head = truncate_chars(text, max_chars.saturating_sub(3));
    let head = match head.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => &head[..pos],
        _ => head,
    };
    format!("{}...", head.trim_end_matches(|c: char| c == ',' || c == ';' || c.is_whitespace()))
}
