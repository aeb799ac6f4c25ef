use crate::config::SummaryConfig;

/// Texts shorter than this are never cut down
const MIN_EXTRACTABLE_LENGTH: usize = 100;
/// Picked sentences shorter than this look like fragments
const MIN_SENTENCE_LENGTH: usize = 40;

/// Split on whitespace that follows sentence-ending punctuation
pub fn split_sentences(text: &str) -> Vec<&str> {
    let text = text.trim();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut prev: Option<char> = None;
    let mut in_gap = false;

    for (i, c) in text.char_indices() {
        if in_gap {
            if c.is_whitespace() {
                continue;
            }
            in_gap = false;
            start = i;
        } else if c.is_whitespace() && matches!(prev, Some('.' | '!' | '?')) {
            sentences.push(&text[start..i]);
            in_gap = true;
        }
        prev = Some(c);
    }

    if !in_gap && start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

/// Picks the highest-scoring sentences of a text
pub struct ExtractiveSummarizer<'a> {
    config: &'a SummaryConfig,
}

impl<'a> ExtractiveSummarizer<'a> {
    pub fn new(config: &'a SummaryConfig) -> Self {
        Self { config }
    }

    /// Two sentences for short texts, three for long ones
    pub fn target_sentences(&self, text: &str) -> usize {
        if text.chars().count() < self.config.long_text_length {
            2
        } else {
            3
        }
    }

    pub fn score_sentence(&self, position: usize, sentence: &str) -> f64 {
        let lower = sentence.to_lowercase();
        let mut score = 0.0;

        // First sentences tend to carry the hook
        if position == 0 {
            score += 5.0;
        } else if position < 3 {
            score += 3.0;
        }

        let words = sentence.split_whitespace().count();
        if (15..=30).contains(&words) {
            score += 4.0;
        } else if (10..15).contains(&words) || (31..=40).contains(&words) {
            score += 2.0;
        }

        score += 1.5 * term_hits(&lower, &self.config.key_terms) as f64;
        score += 2.5 * term_hits(&lower, &self.config.emphasis_terms) as f64;

        if term_hits(&lower, &self.config.junk_phrases) > 0 {
            score -= 10.0;
        }

        score
    }

    pub fn summarize(&self, text: &str, num_sentences: usize) -> String {
        if text.chars().count() < MIN_EXTRACTABLE_LENGTH {
            return text.to_string();
        }

        let sentences = split_sentences(text);
        if sentences.len() <= num_sentences {
            return text.to_string();
        }

        let mut scored: Vec<(f64, usize)> = sentences
            .iter()
            .enumerate()
            .map(|(i, s)| (self.score_sentence(i, s), i))
            .collect();
        // Stable, so equal scores favour the earlier sentence
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut top: Vec<usize> = scored.iter().take(num_sentences).map(|&(_, i)| i).collect();
        top.sort_unstable();

        let picked: Vec<&str> = top.iter().map(|&i| sentences[i].trim()).collect();
        let mut kept: Vec<&str> = if picked.len() > 1 {
            picked.iter().copied().filter(|s| !looks_truncated(s)).collect()
        } else {
            picked.clone()
        };
        if kept.is_empty() {
            kept = picked;
        }

        finish_sentence(&kept.join(" "))
    }
}

fn term_hits(lower: &str, terms: &[String]) -> usize {
    terms
        .iter()
        .filter(|t| !t.is_empty() && lower.contains(t.to_lowercase().as_str()))
        .count()
}

fn looks_truncated(sentence: &str) -> bool {
    sentence.ends_with("...")
        || sentence.ends_with('…')
        || sentence.chars().count() < MIN_SENTENCE_LENGTH
}

/// Collapse trailing periods/ellipses into one period. A final `!` or `?`
/// stands in for the period rather than gaining one.
fn finish_sentence(text: &str) -> String {
    let trimmed = text.trim_end_matches(|c: char| c == '.' || c == '…' || c.is_whitespace());
    if trimmed.ends_with('!') || trimmed.ends_with('?') {
        trimmed.to_string()
    } else {
        format!("{}.", trimmed)
    }
}
