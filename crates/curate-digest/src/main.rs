use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use clap::Parser;
use curation::{
    collect_all, init_logging, list_digest_files, save_digest, ArticleFetcher, Collector, Config,
    CurationConfig, Curator, DigestData, Generator, JsonFeedCollector, SectionBundle, SummaryChain,
};
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser)]
#[command(name = "curate-digest")]
#[command(about = "Curate collected news into a themed newsletter digest")]
struct Args {
    /// Collector feed files (JSON arrays of article records)
    #[arg(short, long = "input", value_name = "FILE")]
    inputs: Vec<PathBuf>,

    /// Number of days to look back for articles
    #[arg(short, long, default_value = "7")]
    days: i64,

    /// Curation policy JSON (defaults to ~/.config/news-digest/curation.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep collected summaries as they are
    #[arg(long)]
    no_summaries: bool,

    /// Summarize from collected text only, without fetching article pages
    #[arg(long)]
    no_fetch: bool,

    /// Where to write the digest
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List saved digests and exit
    #[arg(short, long)]
    list: bool,

    /// Newsletter title
    #[arg(short, long, default_value = "Ferrari F1 Weekly")]
    title: String,
}

/// Start of the look-back window ending at `now`
fn lookback_start(days: i64, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if days < 1 {
        anyhow::bail!("--days must be at least 1, got {}", days);
    }
    Duration::try_days(days)
        .and_then(|window| now.checked_sub_signed(window))
        .with_context(|| format!("--days {} reaches past the supported date range", days))
}

fn print_digest_list() -> Result<()> {
    let files = list_digest_files()?;
    if files.is_empty() {
        println!("No saved digests found.");
        return Ok(());
    }

    println!("Saved digests (newest first):");
    for (path, data) in files {
        println!(
            "  {} - {} ({} articles, {})",
            path.display(),
            data.title,
            data.sections.len(),
            data.created_at
        );
    }
    Ok(())
}

fn print_sections(bundle: &SectionBundle) {
    for (name, section) in bundle.sections() {
        if section.is_empty() {
            continue;
        }
        println!("\n  {}:", name);
        for candidate in section {
            println!("    • {} ({})", candidate.title, candidate.source);
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();

    if args.list {
        return print_digest_list();
    }

    if args.inputs.is_empty() {
        anyhow::bail!("No input feeds given. Pass one or more --input <FILE>.");
    }

    let config = Config::from_env()?;
    let curation = CurationConfig::load(args.config.as_deref())?;
    debug!(
        "Loaded curation policy with {} categories and {} relevance keywords",
        curation.categories.len(),
        curation.relevance_keywords.len()
    );

    let since = lookback_start(args.days, Utc::now())?;

    println!("\n📚 Collecting articles from {} feeds...", args.inputs.len());
    let collectors: Vec<Box<dyn Collector>> = args
        .inputs
        .iter()
        .map(|path| Box::new(JsonFeedCollector::new(path)) as Box<dyn Collector>)
        .collect();
    let candidates = collect_all(&collectors, since).await;

    if candidates.is_empty() {
        println!("No articles found in the past {} days.", args.days);
        return Ok(());
    }
    println!("✓ Found {} articles", candidates.len());

    println!("\n🔎 Curating...");
    let curator = Curator::new(curation);
    let mut bundle = curator.process(candidates);

    if bundle.is_empty() {
        println!("No relevant articles survived curation.");
        return Ok(());
    }
    println!("✓ Selected {} articles", bundle.len());

    if !args.no_summaries {
        let generator = Generator::from_config(&config)?;
        debug!("Generative stage: {:?}", generator);
        if generator.is_configured() {
            println!("\n🤖 Summarizing articles with Claude AI...");
            println!("  (This may take a minute...)");
        } else {
            println!("\n📝 Summarizing articles...");
        }

        let mut chain = SummaryChain::new(curator.config().summary.clone())
            .with_generator(generator)
            .with_timeouts(config.fetch_timeout, config.summary_timeout);
        if !args.no_fetch {
            chain = chain.with_fetcher(ArticleFetcher::new(config.fetch_timeout)?);
        }

        let replaced = chain.summarize_bundle(&mut bundle).await;
        println!("✓ Updated {}/{} summaries", replaced, bundle.len());
    }

    print_sections(&bundle);

    let digest = DigestData::new(args.title, bundle);
    let filepath =
        save_digest(&digest, args.output.as_deref()).context("Failed to save digest")?;

    println!("\n✅ Digest saved to: {}", filepath.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_lookback_start_subtracts_days() {
        let since = lookback_start(7, now()).unwrap();
        assert_eq!(since, Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_lookback_start_rejects_non_positive_days() {
        assert!(lookback_start(0, now()).is_err());
        assert!(lookback_start(-3, now()).is_err());
    }

    #[test]
    fn test_lookback_start_rejects_huge_window() {
        assert!(lookback_start(i64::MAX, now()).is_err());
        assert!(lookback_start(1_000_000_000, now()).is_err());
    }
}
