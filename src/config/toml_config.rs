use crate::core::ConfigProvider;
use crate::utils::error::{Result, UpdateError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is a valid regex")
});

/// Resolved updater settings. Every field has a default, so an empty file is a valid config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub search: SearchConfig,
    pub github: GithubConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    pub venues: Vec<String>,
    pub qualifiers: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            keywords: vec![
                "SLAM".to_string(),
                "Simultaneous Localization and Mapping".to_string(),
            ],
            venues: ["icra", "iros", "ral", "tro"]
                .iter()
                .map(|v| v.to_string())
                .collect(),
            qualifiers: "has:code in:description,topics -topic:documentation -topic:demo"
                .to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubConfig {
    pub api_base: String,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub per_page: usize,
    /// Search only serves the first 1000 results.
    pub max_pages: usize,
    pub page_delay_ms: u64,
    pub repo_delay_ms: u64,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            user_agent: concat!("slam-daily-update/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_seconds: 30,
            per_page: 100,
            max_pages: 10,
            page_delay_ms: 1000,
            repo_delay_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub skip_processed: bool,
    pub only_recently_updated: bool,
    pub recent_days: i64,
    pub max_repos_per_run: usize,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            skip_processed: true,
            only_recently_updated: false,
            recent_days: 7,
            max_repos_per_run: 50,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub workdir: String,
    pub readme_path: String,
    pub processed_file: String,
    pub keep_existing_rows: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            workdir: ".".to_string(),
            readme_path: "README.md".to_string(),
            processed_file: "processed_repos.txt".to_string(),
            keep_existing_rows: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| UpdateError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GITHUB_TOKEN})，未設定的保持原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// An unresolved `${VAR}` placeholder counts as no token.
    pub fn effective_token(&self) -> Option<&str> {
        self.github
            .token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !ENV_VAR_PATTERN.is_match(t))
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("github.api_base", &self.github.api_base)?;
        validation::validate_range("github.per_page", self.github.per_page, 1, 100)?;
        validation::validate_positive_number("github.max_pages", self.github.max_pages, 1)?;
        validation::validate_positive_number(
            "github.timeout_seconds",
            self.github.timeout_seconds as usize,
            1,
        )?;

        validation::validate_non_empty_terms("search.keywords", &self.search.keywords)?;

        validation::validate_positive_number(
            "filter.max_repos_per_run",
            self.filter.max_repos_per_run,
            1,
        )?;
        validation::validate_range("filter.recent_days", self.filter.recent_days, 1, 36_500)?;

        validation::validate_path("output.workdir", &self.output.workdir)?;
        validation::validate_path("output.readme_path", &self.output.readme_path)?;
        validation::validate_path("output.processed_file", &self.output.processed_file)?;

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base(&self) -> &str {
        self.github.api_base.trim_end_matches('/')
    }

    fn token(&self) -> Option<&str> {
        self.effective_token()
    }

    fn user_agent(&self) -> &str {
        &self.github.user_agent
    }

    fn timeout_seconds(&self) -> u64 {
        self.github.timeout_seconds
    }

    fn per_page(&self) -> usize {
        self.github.per_page
    }

    fn max_pages(&self) -> usize {
        self.github.max_pages
    }

    fn page_delay_ms(&self) -> u64 {
        self.github.page_delay_ms
    }

    fn repo_delay_ms(&self) -> u64 {
        self.github.repo_delay_ms
    }

    fn keywords(&self) -> &[String] {
        &self.search.keywords
    }

    fn venues(&self) -> &[String] {
        &self.search.venues
    }

    fn qualifiers(&self) -> &str {
        &self.search.qualifiers
    }

    fn skip_processed(&self) -> bool {
        self.filter.skip_processed
    }

    fn only_recently_updated(&self) -> bool {
        self.filter.only_recently_updated
    }

    fn recent_days(&self) -> i64 {
        self.filter.recent_days
    }

    fn max_repos_per_run(&self) -> usize {
        self.filter.max_repos_per_run
    }

    fn readme_path(&self) -> &str {
        &self.output.readme_path
    }

    fn processed_file(&self) -> &str {
        &self.output.processed_file
    }

    fn keep_existing_rows(&self) -> bool {
        self.output.keep_existing_rows
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
