use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for README sections that are absent.
pub const NOT_PROVIDED: &str = "未提供";

/// Venue label used when neither the README nor the description names one.
pub const OTHER_VENUE: &str = "其他会议";

/// One item of a repository search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchPage {
    #[serde(default)]
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RepoSummary>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RepoDetail {
    pub full_name: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
}

fn default_branch() -> String {
    "main".to_string()
}

/// Response of the contents endpoint; `content` is base64 with embedded newlines.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentFile {
    #[serde(default)]
    pub content: Option<String>,
}

/// Paper metadata scraped from a repository README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperInfo {
    pub title: String,
    pub authors: String,
    pub venue: String,
    pub year: String,
    pub paper_url: String,
}

impl PaperInfo {
    /// The publication year, when the README gave a four-digit one.
    pub fn year_value(&self) -> Option<u16> {
        if self.year.len() == 4 {
            self.year.parse().ok()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperRow {
    pub paper: PaperInfo,
    pub repo_full_name: String,
    pub repo_url: String,
}

/// Search results that survived filtering, plus the ledger they were checked against.
#[derive(Debug, Clone, Default)]
pub struct ExtractResult {
    pub candidates: Vec<RepoSummary>,
    pub known_processed: Vec<String>,
    pub total_found: usize,
}

/// What a single run produced and which repositories it consumed.
#[derive(Debug, Clone, Default)]
pub struct UpdateBatch {
    pub rows: Vec<PaperRow>,
    pub processed: Vec<String>,
    pub known_processed: Vec<String>,
}
