use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to candidates that match no configured keywords
pub const GENERAL_CATEGORY: &str = "General";

/// A normalized article-like record produced by a collector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub source: String,
    pub url: String,
    pub published: DateTime<Utc>,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

fn default_category() -> String {
    GENERAL_CATEGORY.to_string()
}

impl Candidate {
    pub fn new(
        title: impl Into<String>,
        summary: impl Into<String>,
        source: impl Into<String>,
        url: impl Into<String>,
        published: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            summary: summary.into(),
            source: source.into(),
            url: url.into(),
            published,
            category: default_category(),
            image_url: None,
        }
    }

    /// Lowercased `title + " " + summary`, the text every keyword table is matched against
    pub fn search_text(&self) -> String {
        format!("{} {}", self.title, self.summary).to_lowercase()
    }

    /// Title normalized for identity at the collector-merge stage
    pub fn title_key(&self) -> String {
        self.title
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

/// Curated candidates partitioned into newsletter sections
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionBundle {
    pub featured: Vec<Candidate>,
    pub headlines: Vec<Candidate>,
    pub technical: Vec<Candidate>,
}

impl SectionBundle {
    pub fn len(&self) -> usize {
        self.featured.len() + self.headlines.len() + self.technical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sections in rendering order, paired with their names
    pub fn sections(&self) -> [(&'static str, &[Candidate]); 3] {
        [
            ("featured", &self.featured),
            ("headlines", &self.headlines),
            ("technical", &self.technical),
        ]
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Candidate> {
        self.featured
            .iter_mut()
            .chain(self.headlines.iter_mut())
            .chain(self.technical.iter_mut())
    }
}

/// Complete digest for serialization
#[derive(Debug, Serialize, Deserialize)]
pub struct DigestData {
    pub version: String,
    pub created_at: String,
    pub title: String,
    pub sections: SectionBundle,
}

impl DigestData {
    pub fn new(title: impl Into<String>, sections: SectionBundle) -> Self {
        Self {
            version: "1.0".to_string(),
            created_at: Utc::now().to_rfc3339(),
            title: title.into(),
            sections,
        }
    }
}
