use crate::adapters::GitHubClient;
use crate::core::ledger::{load_ledger, read_text_if_exists, render_ledger};
use crate::core::paper_table::{sort_rows, splice_table};
use crate::core::readme_parser::parse_readme;
use crate::core::{ConfigProvider, ExtractResult, PaperRow, Pipeline, RepoSummary, Storage, UpdateBatch};
use crate::utils::error::{Result, UpdateError};
use chrono::Utc;
use std::collections::HashSet;
use std::time::Duration;

pub struct PaperPipeline<S: Storage, C: ConfigProvider> {
    pub(crate) storage: S,
    pub(crate) config: C,
    pub(crate) github: GitHubClient,
}

impl<S: Storage, C: ConfigProvider> PaperPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let github = GitHubClient::new(&config)?;
        Ok(Self {
            storage,
            config,
            github,
        })
    }

    /// Drops duplicates, ledger entries and stale repositories, keeping search order.
    fn select_candidates(&self, repos: Vec<RepoSummary>, known: &[String]) -> Vec<RepoSummary> {
        let known: HashSet<&str> = known.iter().map(String::as_str).collect();
        let now = Utc::now();
        let mut seen = HashSet::new();

        repos
            .into_iter()
            .filter(|repo| seen.insert(repo.full_name.clone()))
            .filter(|repo| {
                let skip = self.config.skip_processed() && known.contains(repo.full_name.as_str());
                if skip {
                    tracing::debug!("Already processed: {}", repo.full_name);
                }
                !skip
            })
            // Age is counted in whole days, so 7d 23h still counts as 7.
            .filter(|repo| {
                !self.config.only_recently_updated()
                    || (now - repo.updated_at).num_days() <= self.config.recent_days()
            })
            .collect()
    }

    async fn build_row(&self, repo: &RepoSummary) -> Result<Option<PaperRow>> {
        let Some(detail) = self.github.repository(&repo.full_name).await? else {
            return Ok(None);
        };

        let readme = self
            .github
            .readme(&repo.full_name, &detail.default_branch)
            .await?
            .unwrap_or_default();

        let paper = parse_readme(&readme, repo.description.as_deref(), self.config.venues());

        Ok(Some(PaperRow {
            paper,
            repo_full_name: repo.full_name.clone(),
            repo_url: repo.html_url.clone(),
        }))
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PaperPipeline<S, C> {
    async fn extract(&self) -> Result<ExtractResult> {
        let known_processed = load_ledger(&self.storage, self.config.processed_file()).await;
        tracing::info!("Loaded {} processed repositories", known_processed.len());

        let query = GitHubClient::search_query(
            self.config.keywords(),
            self.config.venues(),
            self.config.qualifiers(),
        );
        tracing::debug!("Search query: {}", query);

        let repos = self.github.search_repositories(&query).await?;
        let total_found = repos.len();
        if total_found == 0 {
            tracing::info!("No matching repositories found");
        }

        let candidates = self.select_candidates(repos, &known_processed);

        Ok(ExtractResult {
            candidates,
            known_processed,
            total_found,
        })
    }

    async fn transform(&self, data: ExtractResult) -> Result<UpdateBatch> {
        let limit = self.config.max_repos_per_run();
        if data.candidates.len() > limit {
            tracing::info!(
                "Handling {} of {} new repositories this run",
                limit,
                data.candidates.len()
            );
        }

        let delay = Duration::from_millis(self.config.repo_delay_ms());
        let mut rows = Vec::new();
        let mut processed = Vec::new();

        for repo in data.candidates.iter().take(limit) {
            match self.build_row(repo).await {
                Ok(Some(row)) => {
                    tracing::info!(
                        "Processed {} ({} {})",
                        repo.full_name,
                        row.paper.venue,
                        row.paper.year
                    );
                    processed.push(repo.full_name.clone());
                    rows.push(row);

                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
                Ok(None) => {
                    tracing::warn!("Skipping {}: repository details unavailable", repo.full_name);
                }
                Err(e @ UpdateError::RateLimited { .. }) => {
                    tracing::warn!(
                        "Stopping early at {}: {}. Keeping {} rows collected so far",
                        repo.full_name,
                        e,
                        rows.len()
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!("Error processing {}: {}", repo.full_name, e);
                }
            }
        }

        sort_rows(&mut rows);

        Ok(UpdateBatch {
            rows,
            processed,
            known_processed: data.known_processed,
        })
    }

    async fn load(&self, batch: UpdateBatch) -> Result<String> {
        if batch.rows.is_empty() {
            tracing::info!("No new papers, nothing written");
            return Ok("No new papers found".to_string());
        }

        let readme_path = self.config.readme_path();
        let existing = read_text_if_exists(&self.storage, readme_path)
            .await?
            .unwrap_or_default();
        let document = splice_table(&existing, &batch.rows, self.config.keep_existing_rows());
        self.storage.write_file(readme_path, document.as_bytes()).await?;
        tracing::info!("Updated {} with {} papers", readme_path, batch.rows.len());

        let ledger = render_ledger(batch.known_processed.iter().chain(batch.processed.iter()));
        self.storage
            .write_file(self.config.processed_file(), ledger.as_bytes())
            .await?;
        tracing::info!(
            "Recorded {} newly processed repositories in {}",
            batch.processed.len(),
            self.config.processed_file()
        );

        Ok(format!("Added {} papers to {}", batch.rows.len(), readme_path))
    }
}
