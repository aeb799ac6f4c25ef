use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use scraper::Html;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::models::{Candidate, GENERAL_CATEGORY};
use crate::text::normalize_whitespace;

/// Capability: produce a batch of candidates from one source
#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &str;

    async fn collect(&self) -> Result<Vec<Candidate>>;
}

/// A record as it appears in a feed file, before normalization
#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    title: String,
    #[serde(default, alias = "description")]
    summary: String,
    #[serde(default)]
    source: String,
    #[serde(default, alias = "link")]
    url: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
}

impl RawRecord {
    fn into_candidate(self, collected_at: DateTime<Utc>) -> Candidate {
        let published = self
            .published
            .as_deref()
            .and_then(parse_timestamp)
            .unwrap_or(collected_at);

        let mut candidate = Candidate::new(
            normalize_whitespace(&self.title),
            strip_html(&self.summary),
            normalize_whitespace(&self.source),
            self.url.trim(),
            published,
        );
        candidate.category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string());
        candidate.image_url = self.image_url.filter(|u| !u.trim().is_empty());
        candidate
    }
}

/// Reads a JSON array of raw records from a file on disk
pub struct JsonFeedCollector {
    path: PathBuf,
    name: String,
}

impl JsonFeedCollector {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path.display().to_string();
        Self { path, name }
    }
}

#[async_trait]
impl Collector for JsonFeedCollector {
    fn name(&self) -> &str {
        &self.name
    }

    async fn collect(&self) -> Result<Vec<Candidate>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read feed file: {}", self.path.display()))?;

        let records: Vec<RawRecord> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse feed file: {}", self.path.display()))?;

        let collected_at = Utc::now();
        let candidates: Vec<Candidate> = records
            .into_iter()
            .map(|r| r.into_candidate(collected_at))
            .collect();

        debug!("{} produced {} records", self.name, candidates.len());
        Ok(candidates)
    }
}

/// Run every collector and merge the results into one batch.
///
/// A failing collector is logged and skipped. Candidates published before
/// `since` or without a title are dropped, titles that normalize to the same
/// key keep the first occurrence, and the batch comes back newest first.
pub async fn collect_all(collectors: &[Box<dyn Collector>], since: DateTime<Utc>) -> Vec<Candidate> {
    let results = join_all(collectors.iter().map(|c| c.collect())).await;

    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for (collector, result) in collectors.iter().zip(results) {
        let batch = match result {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Collector {} failed: {:#}", collector.name(), e);
                continue;
            }
        };

        for candidate in batch {
            if candidate.title.trim().is_empty() || candidate.published < since {
                continue;
            }
            if seen.insert(candidate.title_key()) {
                merged.push(candidate);
            }
        }
    }

    merged.sort_by(|a, b| b.published.cmp(&a.published));
    info!(
        "Collected {} candidates from {} collectors",
        merged.len(),
        collectors.len()
    );
    merged
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_rfc2822(value))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

fn strip_html(text: &str) -> String {
    if !text.contains('<') && !text.contains('&') {
        return normalize_whitespace(text);
    }
    let fragment = Html::parse_fragment(text);
    normalize_whitespace(&fragment.root_element().text().collect::<String>())
}
