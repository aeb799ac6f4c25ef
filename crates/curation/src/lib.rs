// Public modules
pub mod categorizer;
pub mod chain;
pub mod collector;
pub mod config;
pub mod dedup;
pub mod error;
pub mod extractive;
pub mod extractor;
pub mod filter;
pub mod io;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod ranker;
mod retry;
pub mod scrub;
pub mod sections;
pub mod summarizer;
mod text;

// Re-export commonly used types
pub use chain::SummaryChain;
pub use collector::{collect_all, Collector, JsonFeedCollector};
pub use config::{Config, CurationConfig};
pub use error::ConfigError;
pub use extractor::{ArticleFetcher, ContentFetcher};
pub use io::{get_default_digests_dir, list_digest_files, load_digest, save_digest};
pub use logging::init_logging;
pub use models::{Candidate, DigestData, SectionBundle};
pub use pipeline::Curator;
pub use summarizer::{ClaudeSummarizer, GenerativeSummarizer, Generator};
