use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::models::DigestData;

const DIGEST_VERSION: &str = "1.0";

/// Get the default directory for storing digest files
pub fn get_default_digests_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("news-digest")
        .join("digests");

    fs::create_dir_all(&data_dir).context("Failed to create digests directory")?;

    Ok(data_dir)
}

/// File name for a digest created today
pub fn default_digest_filename() -> String {
    format!("digest-{}.json", Local::now().format("%Y-%m-%d"))
}

/// Save a digest to `path`, or to today's file in the default directory
pub fn save_digest(data: &DigestData, path: Option<&Path>) -> Result<PathBuf> {
    let filepath = match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            path.to_path_buf()
        }
        None => get_default_digests_dir()?.join(default_digest_filename()),
    };

    let json = serde_json::to_string_pretty(data).context("Failed to serialize digest data")?;

    fs::write(&filepath, json)
        .with_context(|| format!("Failed to write digest file: {}", filepath.display()))?;

    Ok(filepath)
}

/// Load a digest from a JSON file
pub fn load_digest(filepath: &Path) -> Result<DigestData> {
    if !filepath.exists() {
        anyhow::bail!("Digest file not found: {}", filepath.display());
    }

    let content = fs::read_to_string(filepath)
        .with_context(|| format!("Failed to read digest file: {}", filepath.display()))?;

    let data: DigestData = serde_json::from_str(&content).with_context(|| {
        format!(
            "Failed to parse digest JSON from {}. The file may be corrupted or not a valid digest file.",
            filepath.display()
        )
    })?;

    if data.version != DIGEST_VERSION {
        anyhow::bail!(
            "Unsupported digest file version: {}. Expected {}. Please regenerate it with curate-digest.",
            data.version,
            DIGEST_VERSION
        );
    }

    if data.sections.is_empty() {
        anyhow::bail!(
            "Digest file {} contains no articles. The file may be incomplete.",
            filepath.display()
        );
    }

    Ok(data)
}

/// List all saved digests in the default directory, newest first
pub fn list_digest_files() -> Result<Vec<(PathBuf, DigestData)>> {
    list_digest_files_in(&get_default_digests_dir()?)
}

pub fn list_digest_files_in(dir: &Path) -> Result<Vec<(PathBuf, DigestData)>> {
    let mut files = Vec::new();

    if dir.exists() {
        for entry in fs::read_dir(dir).context("Failed to read digests directory")? {
            let path = entry?.path();

            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                match load_digest(&path) {
                    Ok(data) => files.push((path, data)),
                    Err(e) => warn!("Could not load {}: {:#}", path.display(), e),
                }
            }
        }
    }

    // Newest first
    files.sort_by(|a, b| {
        let time_a = DateTime::parse_from_rfc3339(&a.1.created_at).ok();
        let time_b = DateTime::parse_from_rfc3339(&b.1.created_at).ok();
        time_b.cmp(&time_a)
    });

    Ok(files)
}
