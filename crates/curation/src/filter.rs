use tracing::info;

use crate::categorizer::Categorizer;
use crate::config::CurationConfig;
use crate::models::Candidate;

/// Keeps candidates that mention the digest's theme and categorizes them
pub struct RelevanceFilter<'a> {
    keywords: Vec<String>,
    categorizer: Categorizer<'a>,
}

impl<'a> RelevanceFilter<'a> {
    pub fn new(config: &'a CurationConfig) -> Self {
        let keywords = config
            .relevance_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        Self {
            keywords,
            categorizer: Categorizer::new(&config.categories),
        }
    }

    pub fn is_relevant(&self, candidate: &Candidate) -> bool {
        let text = candidate.search_text();
        self.keywords.iter().any(|kw| text.contains(kw.as_str()))
    }

    pub fn filter(&self, candidates: Vec<Candidate>) -> Vec<Candidate> {
        let total = candidates.len();

        let relevant: Vec<Candidate> = candidates
            .into_iter()
            .filter(|c| !c.title.trim().is_empty() && self.is_relevant(c))
            .map(|mut c| {
                c.category = self.categorizer.categorize(&c.search_text());
                c
            })
            .collect();

        info!("Filtered {} relevant articles from {} total", relevant.len(), total);
        relevant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn candidate(title: &str, summary: &str) -> Candidate {
        Candidate::new(title, summary, "The Race", "https://the-race.com/a", Utc::now())
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let config = CurationConfig::default();
        let filter = RelevanceFilter::new(&config);
        assert!(filter.is_relevant(&candidate("SCUDERIA confirms test plan", "")));
        assert!(filter.is_relevant(&candidate("Weekend preview", "The Tifosi are ready")));
        assert!(!filter.is_relevant(&candidate("Red Bull wins again", "Verstappen leads")));
    }

    #[test]
    fn test_filter_assigns_categories() {
        let config = CurationConfig::default();
        let filter = RelevanceFilter::new(&config);

        let mut social = candidate("Ferrari floor upgrade spotted", "New diffuser too");
        social.category = "Social Media".to_string();

        let result = filter.filter(vec![social, candidate("Mercedes news", "nothing here")]);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category, "Technical");
    }

    #[test]
    fn test_filter_drops_blank_titles() {
        let config = CurationConfig::default();
        let filter = RelevanceFilter::new(&config);
        let result = filter.filter(vec![candidate("   ", "Ferrari news without a headline")]);
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_matches_yields_empty_list() {
        let config = CurationConfig::default();
        let filter = RelevanceFilter::new(&config);
        assert!(filter.filter(vec![candidate("Cycling", "Tour news")]).is_empty());
        assert!(filter.filter(Vec::new()).is_empty());
    }
}
