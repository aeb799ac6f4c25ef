use crate::config::CategoryRule;
use crate::models::GENERAL_CATEGORY;

/// Assigns a topical bucket by counting keyword hits per category
pub struct Categorizer<'a> {
    rules: &'a [CategoryRule],
}

impl<'a> Categorizer<'a> {
    pub fn new(rules: &'a [CategoryRule]) -> Self {
        Self { rules }
    }

    /// `text` is expected to be lowercased already.
    ///
    /// The highest keyword count wins; on a tie the category declared first
    /// keeps the lead. No hits anywhere yields `General`.
    pub fn categorize(&self, text: &str) -> String {
        let mut best: Option<(&CategoryRule, usize)> = None;

        for rule in self.rules {
            let score = count_hits(text, &rule.keywords);
            if score == 0 {
                continue;
            }
            if best.map_or(true, |(_, top)| score > top) {
                best = Some((rule, score));
            }
        }

        best.map(|(rule, _)| rule.name.clone())
            .unwrap_or_else(|| GENERAL_CATEGORY.to_string())
    }
}

/// Number of distinct keywords that occur as substrings of `text`
pub fn count_hits(text: &str, keywords: &[String]) -> usize {
    keywords
        .iter()
        .filter(|kw| !kw.is_empty() && text.contains(kw.to_lowercase().as_str()))
        .count()
}
