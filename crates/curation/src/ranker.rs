use chrono::{DateTime, Utc};

use crate::categorizer::count_hits;
use crate::config::CurationConfig;
use crate::models::Candidate;

/// Composite sort key, compared lexicographically
pub type PriorityKey = (u32, usize, DateTime<Utc>);

pub fn priority_key(config: &CurationConfig, candidate: &Candidate) -> PriorityKey {
    let category = config.category_weight(&candidate.category);
    let boosts = count_hits(&candidate.search_text(), &config.boost_keywords);
    (category, boosts, candidate.published)
}

/// Orders candidates by category weight, boost-keyword hits, then recency,
/// all descending. Equal keys keep their input order.
pub fn prioritize(config: &CurationConfig, candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut keyed: Vec<(PriorityKey, Candidate)> = candidates
        .into_iter()
        .map(|c| (priority_key(config, &c), c))
        .collect();

    // slice::sort_by is stable
    keyed.sort_by(|a, b| b.0.cmp(&a.0));

    keyed.into_iter().map(|(_, c)| c).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at_hour(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, hour, 0, 0).unwrap()
    }

    fn candidate(title: &str, category: &str, published: DateTime<Utc>) -> Candidate {
        let mut c = Candidate::new(title, "", "The Race", "https://the-race.com", published);
        c.category = category.to_string();
        c
    }

    #[test]
    fn test_technical_ranks_above_general_at_same_time() {
        let config = CurationConfig::default();
        let ranked = prioritize(
            &config,
            vec![
                candidate("Ferrari team news roundup", "General", at_hour(12)),
                candidate("New downforce numbers revealed", "Technical", at_hour(12)),
            ],
        );
        assert_eq!(ranked[0].title, "New downforce numbers revealed");
    }

    #[test]
    fn test_category_weight_beats_keywords_and_recency() {
        let config = CurationConfig::default();
        let ranked = prioritize(
            &config,
            vec![
                candidate("Breaking: exclusive new test", "Strategy", at_hour(20)),
                candidate("Grid penalty", "Race Weekend", at_hour(1)),
            ],
        );
        assert_eq!(ranked[0].category, "Race Weekend");
    }

    #[test]
    fn test_boost_keywords_break_category_ties() {
        let config = CurationConfig::default();
        let ranked = prioritize(
            &config,
            vec![
                candidate("Leclerc on his weekend", "Driver News", at_hour(20)),
                candidate("Exclusive: Leclerc confirmed", "Driver News", at_hour(1)),
            ],
        );
        assert_eq!(ranked[0].title, "Exclusive: Leclerc confirmed");
    }

    #[test]
    fn test_newest_first_on_equal_scores() {
        let config = CurationConfig::default();
        let base = at_hour(12);
        let ranked = prioritize(
            &config,
            vec![
                candidate("Older", "General", base - Duration::hours(3)),
                candidate("Newer", "General", base),
            ],
        );
        assert_eq!(ranked[0].title, "Newer");
    }

    #[test]
    fn test_identical_keys_keep_input_order() {
        let config = CurationConfig::default();
        let input: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .map(|t| candidate(t, "General", at_hour(9)))
            .collect();

        let ranked = prioritize(&config, input);
        let titles: Vec<_> = ranked.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_unknown_category_ranks_below_general() {
        let config = CurationConfig::default();
        let ranked = prioritize(
            &config,
            vec![
                candidate("Tweet", "Social Media", at_hour(23)),
                candidate("Regular", "General", at_hour(1)),
            ],
        );
        assert_eq!(ranked[0].title, "Regular");
    }
}
