use strsim::normalized_levenshtein;
use tracing::{debug, info};

use crate::config::CurationConfig;
use crate::models::Candidate;
use crate::text::truncate_chars;

/// Similarity ratio between two strings (0.0 - 1.0), ignoring case
pub fn similarity(a: &str, b: &str) -> f64 {
    normalized_levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Collapses near-identical candidates across sources
pub struct Deduplicator<'a> {
    config: &'a CurationConfig,
}

impl<'a> Deduplicator<'a> {
    pub fn new(config: &'a CurationConfig) -> Self {
        Self { config }
    }

    pub fn is_duplicate(&self, a: &Candidate, b: &Candidate) -> bool {
        let thresholds = &self.config.dedup;
        let title_sim = similarity(&a.title, &b.title);
        if title_sim > thresholds.title {
            return true;
        }

        let body_sim = similarity(
            truncate_chars(&a.summary, thresholds.body_prefix_chars),
            truncate_chars(&b.summary, thresholds.body_prefix_chars),
        );
        body_sim > thresholds.body && title_sim > thresholds.title_floor
    }

    /// Walks candidates in order against the kept list. The first kept
    /// duplicate found decides: a strictly more authoritative newcomer
    /// replaces it, otherwise the newcomer is dropped.
    ///
    /// A replacement also takes out every other kept item it duplicates,
    /// provided none of them outranks it; if one does, the newcomer is
    /// dropped instead. No two kept items are ever duplicates of each other.
    pub fn deduplicate(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let mut kept: Vec<Candidate> = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let Some(pos) = kept.iter().position(|k| self.is_duplicate(&candidate, k)) else {
                kept.push(candidate);
                continue;
            };

            let authority = self.config.authority(&candidate.source);
            let existing = &kept[pos];
            let outranks_first = authority > self.config.authority(&existing.source);
            let outranked_later = kept[pos + 1..].iter().any(|k| {
                self.config.authority(&k.source) > authority && self.is_duplicate(&candidate, k)
            });

            if outranks_first && !outranked_later {
                debug!(
                    "Replacing '{}' ({}) with '{}' ({})",
                    existing.title, existing.source, candidate.title, candidate.source
                );
                kept.retain(|k| !self.is_duplicate(&candidate, k));
                kept.push(candidate);
            } else {
                debug!(
                    "Dropping '{}' ({}) as duplicate of '{}' ({})",
                    candidate.title, candidate.source, existing.title, existing.source
                );
            }
        }

        info!("Deduplicated to {} unique articles", kept.len());
        kept
    }
}
