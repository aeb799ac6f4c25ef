use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

const APP_DIR: &str = "news-digest";
const DEFAULT_SUMMARY_MODEL: &str = "claude-3-5-haiku-20241022";

/// Runtime settings taken from the environment
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub summary_model: String,
    pub disable_ai: bool,
    pub fetch_timeout: Duration,
    pub summary_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        // Try to load .env from multiple locations
        Self::try_load_dotenv();

        let anthropic_api_key = env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let summary_model =
            env::var("DIGEST_SUMMARY_MODEL").unwrap_or_else(|_| DEFAULT_SUMMARY_MODEL.to_string());

        let disable_ai = env::var("DISABLE_AI")
            .map(|v| !v.is_empty() && v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(false);

        let fetch_timeout = Self::seconds_from_env("DIGEST_FETCH_TIMEOUT_SECS", 20)?;
        let summary_timeout = Self::seconds_from_env("DIGEST_SUMMARY_TIMEOUT_SECS", 60)?;

        Ok(Self {
            anthropic_api_key,
            summary_model,
            disable_ai,
            fetch_timeout,
            summary_timeout,
        })
    }

    fn seconds_from_env(name: &str, default: u64) -> Result<Duration> {
        match env::var(name) {
            Ok(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{} must be a whole number of seconds, got '{}'", name, raw))?;
                if secs == 0 {
                    anyhow::bail!("{} must be greater than zero", name);
                }
                Ok(Duration::from_secs(secs))
            }
            Err(_) => Ok(Duration::from_secs(default)),
        }
    }

    fn try_load_dotenv() {
        // 1. Current directory (for development)
        if dotenvy::dotenv().is_ok() {
            return;
        }

        // 2. ~/.config/news-digest/.env (standard config location)
        if let Some(config_dir) = dirs::config_dir() {
            let config_path = config_dir.join(APP_DIR).join(".env");
            if config_path.exists() && dotenvy::from_path(&config_path).is_ok() {
                return;
            }
        }

        // 3. ~/.env (home directory)
        if let Some(home_dir) = dirs::home_dir() {
            let home_path = home_dir.join(".env");
            if home_path.exists() {
                let _ = dotenvy::from_path(&home_path);
            }
        }

        // If none found, that's okay - environment variables might be set system-wide
    }
}

/// A topical bucket and the keywords that vote for it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub weight: u32,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn new(name: &str, weight: u32, keywords: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            weight,
            keywords: strings(keywords),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DedupThresholds {
    /// Title similarity above which two candidates are duplicates
    pub title: f64,
    /// Body-prefix similarity that also marks a duplicate, given `title_floor`
    pub body: f64,
    pub title_floor: f64,
    /// Number of leading body characters compared
    pub body_prefix_chars: usize,
}

impl Default for DedupThresholds {
    fn default() -> Self {
        Self {
            title: 0.6,
            body: 0.5,
            title_floor: 0.4,
            body_prefix_chars: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SectionLimits {
    pub max_featured: usize,
    pub max_regular: usize,
    pub max_reserved: usize,
    /// Category routed to the dedicated `technical` section
    pub reserved_category: String,
}

impl Default for SectionLimits {
    fn default() -> Self {
        Self {
            max_featured: 1,
            max_regular: 6,
            max_reserved: 5,
            reserved_category: "Technical".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Texts shorter than this (in characters) are returned untouched
    pub min_length: usize,
    /// Results longer than this are squeezed down to two sentences
    pub max_length: usize,
    /// Texts at or above this length get three sentences instead of two
    pub long_text_length: usize,
    pub key_terms: Vec<String>,
    pub emphasis_terms: Vec<String>,
    pub junk_phrases: Vec<String>,
    pub bot_phrases: Vec<String>,
    /// Bot-tainted results below this length are replaced wholesale
    pub bot_dominated_length: usize,
    pub unavailable_placeholder: String,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            min_length: 200,
            max_length: 600,
            long_text_length: 1000,
            key_terms: strings(&[
                "ferrari", "leclerc", "hamilton", "f1", "formula 1", "win", "victory",
                "podium", "race", "test", "championship", "upgrade", "development", "new",
                "first", "announce", "performance", "lap", "pace", "car", "engine", "team",
                "maranello", "scuderia", "vasseur",
            ]),
            emphasis_terms: strings(&[
                "secret", "breakthrough", "innovation", "advantage", "legend", "exclusive",
                "insight", "technical", "development", "update", "optimization", "efficiency",
                "gain", "data", "test", "shakedown", "fiorano", "aerodynamic", "telemetry",
            ]),
            junk_phrases: strings(&["click here", "subscribe", "follow us", "read more"]),
            bot_phrases: strings(&[
                "Anubis is a compromise",
                "administrator of this website has set up Anubis",
                "protect the server against the scourge of AI companies",
                "aggressively scraping websites",
            ]),
            bot_dominated_length: 500,
            unavailable_placeholder:
                "Social media content currently unavailable due to source site protection."
                    .to_string(),
        }
    }
}

/// Tunable curation policy: keyword tables, weights, authority and capacities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurationConfig {
    pub relevance_keywords: Vec<String>,
    /// Declaration order breaks categorization ties
    pub categories: Vec<CategoryRule>,
    pub general_weight: u32,
    pub boost_keywords: Vec<String>,
    pub source_authority: HashMap<String, u32>,
    pub unknown_source_authority: u32,
    pub dedup: DedupThresholds,
    pub sections: SectionLimits,
    pub summary: SummaryConfig,
}

impl Default for CurationConfig {
    fn default() -> Self {
        let source_authority = [
            ("Ferrari.com", 5),
            ("F1 Official", 4),
            ("Motorsport.com", 3),
            ("The Race", 3),
            ("Autosport", 2),
        ]
        .into_iter()
        .map(|(source, rank)| (source.to_string(), rank))
        .collect();

        Self {
            relevance_keywords: strings(&[
                "ferrari", "leclerc", "hamilton", "lewis hamilton", "charles leclerc", "sf-26",
                "sf26", "maranello", "scuderia", "vasseur", "fred vasseur", "prancing horse",
                "tifosi", "italian team",
            ]),
            categories: vec![
                CategoryRule::new(
                    "Race Weekend",
                    4,
                    &[
                        "race", "grand prix", "gp", "qualifying", "quali", "sprint", "podium",
                        "win", "victory", "finish", "result", "grid",
                    ],
                ),
                CategoryRule::new(
                    "Technical",
                    5,
                    &[
                        "downforce", "aerodynamic", "aero", "power unit", "engine", "suspension",
                        "floor", "diffuser", "sidepod", "wing", "brake", "upgrade", "development",
                        "chassis", "gearbox", "mgu", "ers", "battery", "cooling", "exhaust",
                    ],
                ),
                CategoryRule::new(
                    "Driver News",
                    3,
                    &[
                        "leclerc", "hamilton", "driver", "interview", "contract", "comment",
                        "said", "says", "believes", "thinks", "feeling",
                    ],
                ),
                CategoryRule::new(
                    "Strategy",
                    2,
                    &[
                        "strategy", "prediction", "analysis", "expect", "outlook", "forecast",
                        "preview", "review", "comparison",
                    ],
                ),
            ],
            general_weight: 1,
            boost_keywords: strings(&[
                "exclusive", "breaking", "official", "confirmed", "announced", "upgrade", "new",
                "first", "test", "unveil", "reveal",
            ]),
            source_authority,
            unknown_source_authority: 1,
            dedup: DedupThresholds::default(),
            sections: SectionLimits::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl CurationConfig {
    /// Load policy from `path`, else from the user config dir, else built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };

        config.validate().context("Invalid curation configuration")?;
        Ok(config)
    }

    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("curation.json"))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read curation config: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse curation config: {}", path.display()))
    }

    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if self.relevance_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(ConfigError::NoRelevanceKeywords);
        }
        if self.categories.is_empty() {
            return Err(ConfigError::NoCategories);
        }

        let mut seen = HashSet::new();
        for rule in &self.categories {
            if rule.keywords.iter().all(|k| k.trim().is_empty()) {
                return Err(ConfigError::EmptyCategory(rule.name.clone()));
            }
            if !seen.insert(rule.name.as_str()) {
                return Err(ConfigError::DuplicateCategory(rule.name.clone()));
            }
        }

        let limits = &self.sections;
        for (name, value) in [
            ("max_featured", limits.max_featured),
            ("max_regular", limits.max_regular),
            ("max_reserved", limits.max_reserved),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroCapacity(name));
            }
        }
        if !seen.contains(limits.reserved_category.as_str()) {
            return Err(ConfigError::UnknownReservedCategory(
                limits.reserved_category.clone(),
            ));
        }

        for (name, value) in [
            ("title", self.dedup.title),
            ("body", self.dedup.body),
            ("title_floor", self.dedup.title_floor),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ThresholdOutOfRange { name, value });
            }
        }

        let summary = &self.summary;
        for (name, value) in [
            ("min_length", summary.min_length),
            ("max_length", summary.max_length),
            ("long_text_length", summary.long_text_length),
        ] {
            if value == 0 {
                return Err(ConfigError::ZeroLimit(name));
            }
        }
        if summary.unavailable_placeholder.trim().is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }

        Ok(())
    }

    /// Authority rank of a source; unknown sources rank lowest
    pub fn authority(&self, source: &str) -> u32 {
        self.source_authority
            .get(source)
            .copied()
            .unwrap_or(self.unknown_source_authority)
    }

    /// Ordinal weight of a category label; labels outside the table weigh zero
    pub fn category_weight(&self, category: &str) -> u32 {
        if category == crate::models::GENERAL_CATEGORY {
            return self.general_weight;
        }
        self.categories
            .iter()
            .find(|rule| rule.name == category)
            .map(|rule| rule.weight)
            .unwrap_or(0)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
