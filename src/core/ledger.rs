//! The processed-repositories ledger: one `owner/name` per line.

use crate::core::Storage;
use crate::utils::error::{Result, UpdateError};
use std::collections::BTreeSet;

pub fn parse_ledger(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Sorted, de-duplicated, newline separated, no trailing newline.
pub fn render_ledger<I, S>(names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().trim().to_string())
        .filter(|name| !name.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect::<Vec<_>>()
        .join("\n")
}

/// `Ok(None)` when the file does not exist yet. Undecodable bytes are a
/// storage failure, not a data one.
pub async fn read_text_if_exists<S: Storage>(storage: &S, path: &str) -> Result<Option<String>> {
    match storage.read_file(path).await {
        Ok(bytes) => String::from_utf8(bytes).map(Some).map_err(|e| {
            UpdateError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("{} is not valid UTF-8: {}", path, e),
            ))
        }),
        Err(UpdateError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

/// A missing or unreadable ledger counts as empty.
pub async fn load_ledger<S: Storage>(storage: &S, path: &str) -> Vec<String> {
    match read_text_if_exists(storage, path).await {
        Ok(Some(text)) => parse_ledger(&text),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to load processed ledger {}: {}", path, e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::LocalStorage;
    use crate::utils::error::{ErrorCategory, ErrorSeverity};
    use tempfile::TempDir;

    #[test]
    fn test_parse_skips_blank_lines() {
        let names = parse_ledger("  a/one \n\n\tb/two\n   \n");
        assert_eq!(names, ["a/one", "b/two"]);
    }

    #[test]
    fn test_render_sorts_and_dedups() {
        let rendered = render_ledger(["c/three", "a/one", "c/three", " b/two ", ""]);
        assert_eq!(rendered, "a/one\nb/two\nc/three");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_ledger(Vec::<String>::new()), "");
    }

    #[tokio::test]
    async fn test_load_missing_ledger_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        assert!(load_ledger(&storage, "processed_repos.txt").await.is_empty());
    }

    #[tokio::test]
    async fn test_load_invalid_utf8_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("processed_repos.txt"), [0xff, 0xfe, 0x00]).unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        assert!(load_ledger(&storage, "processed_repos.txt").await.is_empty());
    }

    #[tokio::test]
    async fn test_invalid_utf8_file_is_storage_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("README.md"), [0xff, 0xfe]).unwrap();
        let storage = LocalStorage::new(temp_dir.path());

        let err = read_text_if_exists(&storage, "README.md").await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.severity().exit_code(), 1);
        assert!(err.to_string().contains("README.md"));
    }

    #[tokio::test]
    async fn test_load_existing_ledger() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("processed_repos.txt"), "x/y\nz/w").unwrap();
        let storage = LocalStorage::new(temp_dir.path());
        assert_eq!(load_ledger(&storage, "processed_repos.txt").await, ["x/y", "z/w"]);
    }
}
