//! Extracts paper metadata from the structured README template used by the
//! SLAM list: each field is a `## <emoji> <label>: value` section.

use crate::domain::model::{PaperInfo, NOT_PROVIDED, OTHER_VENUE};
use regex::Regex;
use std::sync::LazyLock;

/// A section value runs until the next `##` line or the end of the README.
fn section_pattern(heading: &str, value: &str) -> Regex {
    let pattern = format!(r"(?i)##\s*{}\s*[:：]\s*({})\s*(?:\n##|\z)", regex::escape(heading), value);
    Regex::new(&pattern).expect("section pattern is a valid regex")
}

static TITLE: LazyLock<Regex> = LazyLock::new(|| section_pattern("📄 论文标题", r"[\s\S]+?"));
static AUTHORS: LazyLock<Regex> = LazyLock::new(|| section_pattern("👥 作者", r"[\s\S]+?"));
static VENUE: LazyLock<Regex> = LazyLock::new(|| section_pattern("📅 会议/期刊", r"[\s\S]+?"));
static YEAR: LazyLock<Regex> = LazyLock::new(|| section_pattern("📆 发表年份", r"\d{4}"));
static PAPER: LazyLock<Regex> = LazyLock::new(|| section_pattern("📜 论文链接", r"[\s\S]+?"));

fn capture(pattern: &Regex, readme: &str) -> String {
    pattern
        .captures(readme)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| NOT_PROVIDED.to_string())
}

/// First configured venue mentioned in the description, upper-cased.
pub fn infer_venue(description: Option<&str>, venues: &[String]) -> String {
    let description = description.unwrap_or_default().to_lowercase();
    venues
        .iter()
        .find(|venue| !venue.is_empty() && description.contains(&venue.to_lowercase()))
        .map(|venue| venue.to_uppercase())
        .unwrap_or_else(|| OTHER_VENUE.to_string())
}

pub fn parse_readme(readme: &str, description: Option<&str>, venues: &[String]) -> PaperInfo {
    let readme = readme.replace("\r\n", "\n");

    let mut venue = capture(&VENUE, &readme);
    if venue == NOT_PROVIDED {
        venue = infer_venue(description, venues);
    }

    PaperInfo {
        title: capture(&TITLE, &readme),
        authors: capture(&AUTHORS, &readme),
        venue,
        year: capture(&YEAR, &readme),
        paper_url: capture(&PAPER, &readme),
    }
}
