use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::retry::attempt_timeout;
use crate::text::truncate_chars;

/// Input beyond this many characters is not sent to the model
const MAX_INPUT_CHARS: usize = 4000;
const MAX_ATTEMPTS: u32 = 3;

/// Capability: condense article text into a short newsletter description
#[async_trait]
pub trait GenerativeSummarizer: Send + Sync {
    fn name(&self) -> &str;

    /// `Ok(None)` means the provider had nothing useful to say
    async fn summarize(&self, text: &str) -> Result<Option<String>>;
}

/// The generative stage of the summary chain, explicitly set up by the caller
#[derive(Clone, Default)]
pub enum Generator {
    #[default]
    NotConfigured,
    Configured(Arc<dyn GenerativeSummarizer>),
}

impl Generator {
    pub fn new(summarizer: impl GenerativeSummarizer + 'static) -> Self {
        Generator::Configured(Arc::new(summarizer))
    }

    /// Claude when an API key is present and AI is not disabled
    pub fn from_config(config: &Config) -> Result<Self> {
        if config.disable_ai {
            debug!("Generative summarizer disabled via DISABLE_AI");
            return Ok(Generator::NotConfigured);
        }

        match &config.anthropic_api_key {
            Some(key) => Ok(Generator::new(ClaudeSummarizer::new(
                key.clone(),
                config.summary_model.clone(),
                config.summary_timeout,
            )?)),
            None => {
                debug!("No ANTHROPIC_API_KEY set, generative summarizer not configured");
                Ok(Generator::NotConfigured)
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Generator::Configured(_))
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Generator::NotConfigured => f.write_str("NotConfigured"),
            Generator::Configured(s) => f.debug_tuple("Configured").field(&s.name()).finish(),
        }
    }
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    content: Vec<Content>,
}

#[derive(Deserialize)]
struct Content {
    text: String,
}

pub struct ClaudeSummarizer {
    client: Client,
    api_key: String,
    model: String,
    request_timeout: Duration,
}

fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(1000 * 2_u64.pow(attempt))
}

impl ClaudeSummarizer {
    /// `budget` bounds one whole summarization, retries included
    pub fn new(api_key: String, model: String, budget: Duration) -> Result<Self> {
        let request_timeout = attempt_timeout(budget, MAX_ATTEMPTS, backoff);
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            model,
            request_timeout,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    async fn try_summarize(&self, content: &str) -> Result<Option<String>> {
        let prompt = format!(
            r#"You write the blurbs for a weekly motorsport newsletter. Summarize the article below in two or three sentences.

RULES:
1. Stay under 600 characters
2. Use ONLY facts from the article - no external knowledge
3. Plain prose, no bullet points, no headings, no preamble
4. If the article has no usable content, respond with exactly: NONE

Article:
{}"#,
            truncate_chars(content, MAX_INPUT_CHARS)
        );

        let request = ClaudeRequest {
            model: self.model.clone(),
            max_tokens: 300,
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Claude API")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("unknown error"));
            anyhow::bail!("Claude API error: {}", error_text);
        }

        let claude_response = response
            .json::<ClaudeResponse>()
            .await
            .context("Failed to parse Claude API response")?;

        let text = claude_response
            .content
            .first()
            .map(|c| c.text.trim())
            .unwrap_or("");

        if text.is_empty() || text == "NONE" {
            return Ok(None);
        }
        Ok(Some(text.to_string()))
    }
}

#[async_trait]
impl GenerativeSummarizer for ClaudeSummarizer {
    fn name(&self) -> &str {
        "Claude"
    }

    async fn summarize(&self, text: &str) -> Result<Option<String>> {
        for attempt in 0..MAX_ATTEMPTS {
            match self.try_summarize(text).await {
                Ok(summary) => return Ok(summary),
                Err(e) => {
                    if attempt + 1 == MAX_ATTEMPTS {
                        return Err(e);
                    }

                    // Longer backoff for rate limits
                    let is_rate_limit = e.to_string().contains("rate_limit");
                    let wait = if is_rate_limit {
                        Duration::from_secs(15 * (attempt as u64 + 1))
                    } else {
                        backoff(attempt)
                    };

                    if is_rate_limit {
                        warn!("Rate limit hit, waiting {:?} before retry...", wait);
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_timeout_leaves_room_for_retries() {
        let budget = Duration::from_secs(60);
        let summarizer =
            ClaudeSummarizer::new("sk-test".to_string(), "model".to_string(), budget).unwrap();

        let spent = summarizer.request_timeout() * MAX_ATTEMPTS + backoff(0) + backoff(1);
        assert!(summarizer.request_timeout() < budget);
        assert!(spent <= budget);
    }

    #[test]
    fn test_generator_not_configured_without_key() {
        let config = Config {
            anthropic_api_key: None,
            summary_model: "model".to_string(),
            disable_ai: false,
            fetch_timeout: Duration::from_secs(1),
            summary_timeout: Duration::from_secs(1),
        };
        assert!(!Generator::from_config(&config).unwrap().is_configured());
    }

    #[test]
    fn test_generator_disabled_flag_wins_over_key() {
        let config = Config {
            anthropic_api_key: Some("sk-test".to_string()),
            summary_model: "model".to_string(),
            disable_ai: true,
            fetch_timeout: Duration::from_secs(1),
            summary_timeout: Duration::from_secs(1),
        };
        assert!(!Generator::from_config(&config).unwrap().is_configured());
    }

    #[test]
    fn test_generator_configured_with_key() {
        let config = Config {
            anthropic_api_key: Some("sk-test".to_string()),
            summary_model: "model".to_string(),
            disable_ai: false,
            fetch_timeout: Duration::from_secs(1),
            summary_timeout: Duration::from_secs(1),
        };
        let generator = Generator::from_config(&config).unwrap();
        assert!(generator.is_configured());
        assert_eq!(format!("{:?}", generator), "Configured(\"Claude\")");
    }
}
