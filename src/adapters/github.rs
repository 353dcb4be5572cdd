//! Read-only client for the parts of the GitHub REST API the updater needs:
//! repository search, repository details and README contents.
//!
//! Status handling is uniform across endpoints. A 403 or 429 aborts with
//! [`UpdateError::RateLimited`]; a 404 or any other failure is logged and
//! surfaces as `Ok(None)` so one bad repository does not sink the run.

use crate::core::ConfigProvider;
use crate::domain::model::{ContentFile, RepoDetail, RepoSummary, SearchPage};
use crate::utils::error::{Result, UpdateError};
use base64::Engine;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, ACCEPT, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

pub struct GitHubClient {
    client: Client,
    api_base: String,
    token: Option<String>,
    per_page: usize,
    max_pages: usize,
    page_delay: Duration,
}

impl GitHubClient {
    pub fn new<C: ConfigProvider>(config: &C) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(config.timeout_seconds()))
            .build()?;

        Ok(Self {
            client,
            api_base: config.api_base().trim_end_matches('/').to_string(),
            token: config.token().map(str::to_string),
            per_page: config.per_page(),
            max_pages: config.max_pages(),
            page_delay: Duration::from_millis(config.page_delay_ms()),
        })
    }

    /// Keywords, then venues, then the search qualifiers, space separated.
    pub fn search_query(keywords: &[String], venues: &[String], qualifiers: &str) -> String {
        keywords
            .iter()
            .chain(venues.iter())
            .map(String::as_str)
            .chain(std::iter::once(qualifiers))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Walks the search result pages, most recently updated first.
    pub async fn search_repositories(&self, query: &str) -> Result<Vec<RepoSummary>> {
        let url = format!("{}/search/repositories", self.api_base);
        let mut all_repos = Vec::new();

        for page in 1..=self.max_pages {
            let params = [
                ("q", query.to_string()),
                ("sort", "updated".to_string()),
                ("order", "desc".to_string()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ];

            let Some(result) = self.get_json::<SearchPage>(&url, &params).await? else {
                break;
            };
            if result.items.is_empty() {
                break;
            }

            let count = result.items.len();
            all_repos.extend(result.items);
            info!(
                "Fetched search page {}, {} repositories so far (total reported: {})",
                page,
                all_repos.len(),
                result.total_count
            );

            if count < self.per_page || page == self.max_pages {
                break;
            }

            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        Ok(all_repos)
    }

    pub async fn repository(&self, full_name: &str) -> Result<Option<RepoDetail>> {
        let url = format!("{}/repos/{}", self.api_base, full_name);
        self.get_json(&url, &[]).await
    }

    /// README.md on `branch`, decoded. A response without content reads as an empty README.
    pub async fn readme(&self, full_name: &str, branch: &str) -> Result<Option<String>> {
        let url = format!("{}/repos/{}/contents/README.md", self.api_base, full_name);
        let params = [("ref", branch.to_string())];

        let Some(file) = self.get_json::<ContentFile>(&url, &params).await? else {
            return Ok(None);
        };

        match file.content {
            Some(encoded) => decode_content(&encoded).map(Some),
            None => Ok(Some(String::new())),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<Option<T>> {
        let mut request = self.client.get(url).header(ACCEPT, GITHUB_ACCEPT).query(params);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("token {}", token));
        }

        debug!("GET {}", url);
        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!("Request to {} failed: {}", url, e);
                return Ok(None);
            }
        };

        let status = response.status();
        match status {
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                return Err(UpdateError::RateLimited {
                    reset_at: rate_limit_reset(response.headers()),
                });
            }
            StatusCode::NOT_FOUND => {
                warn!("Not found: {}", url);
                return Ok(None);
            }
            s if !s.is_success() => {
                let err = UpdateError::GitHubApiError {
                    status: s.as_u16(),
                    url: url.to_string(),
                };
                warn!("{} ({:?}), skipping", err, err.category());
                return Ok(None);
            }
            _ => {}
        }

        match response.json::<T>().await {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                warn!("Unexpected response body from {}: {}", url, e);
                Ok(None)
            }
        }
    }
}

/// `X-RateLimit-Reset` is epoch seconds; without it the limit is assumed to reset now.
fn rate_limit_reset(headers: &HeaderMap) -> DateTime<Utc> {
    headers
        .get("x-ratelimit-reset")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
}

/// The contents API wraps base64 at 60 columns, so whitespace is dropped before decoding.
pub fn decode_content(encoded: &str) -> Result<String> {
    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = base64::engine::general_purpose::STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::toml_config::TomlConfig;
    use httpmock::prelude::*;

    fn test_config(base_url: &str, per_page: usize) -> TomlConfig {
        let mut config = TomlConfig::default();
        config.github.api_base = base_url.to_string();
        config.github.token = Some("ghp_test".to_string());
        config.github.per_page = per_page;
        config.github.page_delay_ms = 0;
        config
    }

    fn repo_item(name: &str) -> serde_json::Value {
        serde_json::json!({
            "full_name": name,
            "html_url": format!("https://github.com/{}", name),
            "description": "LiDAR SLAM, ICRA 2024",
            "updated_at": "2024-06-01T00:00:00Z"
        })
    }

    #[test]
    fn test_search_query_order() {
        let config = TomlConfig::default();
        let query = GitHubClient::search_query(
            &config.search.keywords,
            &config.search.venues,
            &config.search.qualifiers,
        );
        assert_eq!(
            query,
            "SLAM Simultaneous Localization and Mapping icra iros ral tro \
             has:code in:description,topics -topic:documentation -topic:demo"
        );
    }

    #[test]
    fn test_decode_content_with_line_breaks() {
        // "## 📄 论文标题: Test\n" wrapped the way the contents API does it
        let encoded = "IyMg8J+ThCDorrrmlofmoIfpopg6\nIFRlc3QK\n";
        assert_eq!(decode_content(encoded).unwrap(), "## 📄 论文标题: Test\n");
    }

    #[test]
    fn test_decode_content_rejects_garbage() {
        assert!(matches!(
            decode_content("!!!not base64!!!"),
            Err(UpdateError::DecodeError(_))
        ));
    }

    #[tokio::test]
    async fn test_search_stops_on_short_page() {
        let server = MockServer::start();
        let page1 = server.mock(|when, then| {
            when.method(GET)
                .path("/search/repositories")
                .query_param("page", "1")
                .query_param("per_page", "2")
                .query_param("sort", "updated")
                .header("authorization", "token ghp_test");
            then.status(200).json_body(serde_json::json!({
                "total_count": 3,
                "items": [repo_item("a/one"), repo_item("b/two")]
            }));
        });
        let page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/search/repositories")
                .query_param("page", "2");
            then.status(200).json_body(serde_json::json!({
                "total_count": 3,
                "items": [repo_item("c/three")]
            }));
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 2)).unwrap();
        let repos = client.search_repositories("SLAM").await.unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(repos.len(), 3);
        assert_eq!(repos[2].full_name, "c/three");
    }

    #[tokio::test]
    async fn test_search_stops_on_empty_page() {
        let server = MockServer::start();
        let page1 = server.mock(|when, then| {
            when.method(GET)
                .path("/search/repositories")
                .query_param("page", "1");
            then.status(200).json_body(serde_json::json!({
                "total_count": 1,
                "items": [repo_item("a/one")]
            }));
        });
        let page2 = server.mock(|when, then| {
            when.method(GET)
                .path("/search/repositories")
                .query_param("page", "2");
            then.status(200)
                .json_body(serde_json::json!({ "total_count": 1, "items": [] }));
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 1)).unwrap();
        let repos = client.search_repositories("SLAM").await.unwrap();

        page1.assert();
        page2.assert();
        assert_eq!(repos.len(), 1);
    }

    #[tokio::test]
    async fn test_search_respects_max_pages() {
        let server = MockServer::start();
        let pages = server.mock(|when, then| {
            when.method(GET).path("/search/repositories");
            then.status(200).json_body(serde_json::json!({
                "total_count": 100,
                "items": [repo_item("a/one")]
            }));
        });

        let mut config = test_config(&server.base_url(), 1);
        config.github.max_pages = 3;
        let client = GitHubClient::new(&config).unwrap();
        let repos = client.search_repositories("SLAM").await.unwrap();

        pages.assert_hits(3);
        assert_eq!(repos.len(), 3);
    }

    #[tokio::test]
    async fn test_forbidden_is_rate_limited() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/search/repositories");
            then.status(403).header("X-RateLimit-Reset", "1700000000");
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 100)).unwrap();
        let err = client.search_repositories("SLAM").await.unwrap_err();

        match err {
            UpdateError::RateLimited { reset_at } => {
                assert_eq!(reset_at.timestamp(), 1_700_000_000)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_not_found_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/gone/away");
            then.status(404);
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 100)).unwrap();
        assert!(client.repository("gone/away").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_server_error_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/flaky/repo");
            then.status(502);
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 100)).unwrap();
        assert!(client.repository("flaky/repo").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_readme_uses_branch_and_decodes() {
        let server = MockServer::start();
        let readme = server.mock(|when, then| {
            when.method(GET)
                .path("/repos/a/one/contents/README.md")
                .query_param("ref", "dev");
            then.status(200).json_body(serde_json::json!({
                "name": "README.md",
                "encoding": "base64",
                "content": "SGVs\nbG8=\n"
            }));
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 100)).unwrap();
        let content = client.readme("a/one", "dev").await.unwrap();

        readme.assert();
        assert_eq!(content.as_deref(), Some("Hello"));
    }

    #[tokio::test]
    async fn test_readme_without_content_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/repos/a/one/contents/README.md");
            then.status(200)
                .json_body(serde_json::json!({ "name": "README.md", "type": "file" }));
        });

        let client = GitHubClient::new(&test_config(&server.base_url(), 100)).unwrap();
        assert_eq!(
            client.readme("a/one", "main").await.unwrap().as_deref(),
            Some("")
        );
    }
}
