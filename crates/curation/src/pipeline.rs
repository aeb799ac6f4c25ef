use tracing::info;

use crate::config::CurationConfig;
use crate::dedup::Deduplicator;
use crate::filter::RelevanceFilter;
use crate::models::{Candidate, SectionBundle};
use crate::ranker::prioritize;
use crate::sections::allocate;

/// Runs a collected batch through filter, dedup, ranking and allocation
pub struct Curator {
    config: CurationConfig,
}

impl Curator {
    pub fn new(config: CurationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CurationConfig {
        &self.config
    }

    pub fn process(&self, candidates: Vec<Candidate>) -> SectionBundle {
        let relevant = RelevanceFilter::new(&self.config).filter(candidates);
        let unique = Deduplicator::new(&self.config).deduplicate(relevant);
        let ranked = prioritize(&self.config, unique);
        let bundle = allocate(&self.config.sections, ranked);

        info!(
            "Selected {} featured, {} headlines, {} technical",
            bundle.featured.len(),
            bundle.headlines.len(),
            bundle.technical.len()
        );
        bundle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    fn candidate(title: &str, summary: &str, source: &str, hour: u32) -> Candidate {
        Candidate::new(title, summary, source, "https://example.com", at_hour(hour))
    }

    fn titles(section: &[Candidate]) -> Vec<&str> {
        section.iter().map(|c| c.title.as_str()).collect()
    }

    fn weekend_batch() -> Vec<Candidate> {
        vec![
            candidate(
                "Ferrari reveals new front wing design",
                "The Scuderia brought a revised front wing and floor upgrade to Bahrain for the final test day.",
                "Autosport",
                10,
            ),
            candidate(
                "Leclerc wins the Bahrain Grand Prix",
                "Charles Leclerc took victory from pole position.",
                "F1 Official",
                9,
            ),
            candidate(
                "Red Bull dominate in Bahrain",
                "Verstappen led every lap of the session.",
                "The Race",
                11,
            ),
            candidate(
                "Ferrari unveils new front wing",
                "Ferrari brought a revised front wing and floor upgrade to Bahrain for the last day of testing.",
                "Ferrari.com",
                8,
            ),
            candidate(
                "Hamilton praises downforce of the SF-26",
                "Lewis Hamilton liked the downforce of the car on day two.",
                "The Race",
                7,
            ),
            candidate(
                "Tifosi fill Monza grandstands",
                "Fans turned out in huge crowds at Monza on Sunday.",
                "Motorsport.com",
                12,
            ),
            candidate(
                "Vasseur outlines season strategy",
                "Fred Vasseur gave his outlook for the year ahead.",
                "The Race",
                6,
            ),
        ]
    }

    #[test]
    fn test_process_full_weekend() {
        let curator = Curator::new(CurationConfig::default());
        let bundle = curator.process(weekend_batch());

        assert_eq!(titles(&bundle.featured), ["Leclerc wins the Bahrain Grand Prix"]);
        assert_eq!(
            titles(&bundle.headlines),
            ["Vasseur outlines season strategy", "Tifosi fill Monza grandstands"]
        );
        assert_eq!(
            titles(&bundle.technical),
            ["Ferrari unveils new front wing", "Hamilton praises downforce of the SF-26"]
        );
    }

    #[test]
    fn test_process_prefers_official_source_for_duplicates() {
        let curator = Curator::new(CurationConfig::default());
        let bundle = curator.process(weekend_batch());

        let wing: Vec<&Candidate> = bundle
            .technical
            .iter()
            .filter(|c| c.title.contains("front wing"))
            .collect();
        assert_eq!(wing.len(), 1);
        assert_eq!(wing[0].source, "Ferrari.com");
    }

    #[test]
    fn test_process_categorizes_and_drops_off_theme() {
        let curator = Curator::new(CurationConfig::default());
        let bundle = curator.process(weekend_batch());

        assert_eq!(bundle.len(), 5);
        assert!(bundle.sections().iter().all(|(_, s)| s.iter().all(|c| !c.title.contains("Red Bull"))));
        assert_eq!(bundle.featured[0].category, "Race Weekend");
        assert_eq!(bundle.technical[1].category, "Technical");
        assert_eq!(bundle.headlines[1].category, "General");
    }

    #[test]
    fn test_process_empty_batch() {
        let curator = Curator::new(CurationConfig::default());
        assert!(curator.process(Vec::new()).is_empty());
    }

    #[test]
    fn test_process_respects_configured_capacities() {
        let mut config = CurationConfig::default();
        config.sections.max_reserved = 1;
        config.sections.max_regular = 1;
        let bundle = Curator::new(config).process(weekend_batch());

        assert_eq!(titles(&bundle.technical), ["Ferrari unveils new front wing"]);
        assert_eq!(titles(&bundle.headlines), ["Vasseur outlines season strategy"]);
        assert_eq!(bundle.len(), 3);
    }
}
