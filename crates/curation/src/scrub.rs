use tracing::warn;

use crate::config::SummaryConfig;

fn has_bot_phrase(text: &str, phrases: &[String]) -> bool {
    phrases.iter().any(|p| !p.is_empty() && text.contains(p.as_str()))
}

/// Detect and remove anti-bot challenge text that leaked into scraped content.
///
/// Short tainted text becomes the unavailable-content placeholder. Longer text
/// loses only the paragraphs carrying a challenge phrase.
pub fn clean_bot_messages(config: &SummaryConfig, text: &str) -> String {
    if !has_bot_phrase(text, &config.bot_phrases) {
        return text.to_string();
    }

    if text.chars().count() < config.bot_dominated_length {
        warn!("Anti-bot message dominates summary, using placeholder");
        return config.unavailable_placeholder.clone();
    }

    let cleaned = text
        .split("\n\n")
        .filter(|p| !has_bot_phrase(p, &config.bot_phrases))
        .collect::<Vec<_>>()
        .join("\n\n");

    if cleaned.trim().is_empty() {
        config.unavailable_placeholder.clone()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_is_untouched() {
        let config = SummaryConfig::default();
        let text = "Leclerc was fastest in the morning session.";
        assert_eq!(clean_bot_messages(&config, text), text);
    }

    #[test]
    fn test_short_bot_text_becomes_placeholder() {
        let config = SummaryConfig::default();
        let text = "Leclerc was fastest. Anubis is a compromise between blocking everyone and nobody.";
        assert_eq!(
            clean_bot_messages(&config, text),
            config.unavailable_placeholder
        );
    }

    #[test]
    fn test_long_text_loses_only_bot_paragraphs() {
        let config = SummaryConfig::default();
        let good = "Ferrari ran a long programme on the final day of testing. ".repeat(6);
        let bad = "The administrator of this website has set up Anubis to protect the server.";
        let text = format!("{}\n\n{}\n\n{}", good.trim(), bad, good.trim());

        let cleaned = clean_bot_messages(&config, &text);
        assert!(!cleaned.contains("Anubis"));
        assert_eq!(cleaned, format!("{}\n\n{}", good.trim(), good.trim()));
    }

    #[test]
    fn test_long_single_bot_paragraph_falls_back_to_placeholder() {
        let config = SummaryConfig::default();
        let text = format!("Anubis is a compromise. {}", "Filler text here. ".repeat(40));
        assert_eq!(
            clean_bot_messages(&config, &text),
            config.unavailable_placeholder
        );
    }
}
