use crate::domain::model::{ExtractResult, UpdateBatch};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn api_base(&self) -> &str;
    fn token(&self) -> Option<&str>;
    fn user_agent(&self) -> &str;
    fn timeout_seconds(&self) -> u64;
    fn per_page(&self) -> usize;
    fn max_pages(&self) -> usize;
    fn page_delay_ms(&self) -> u64;
    fn repo_delay_ms(&self) -> u64;

    fn keywords(&self) -> &[String];
    fn venues(&self) -> &[String];
    fn qualifiers(&self) -> &str;

    fn skip_processed(&self) -> bool;
    fn only_recently_updated(&self) -> bool;
    fn recent_days(&self) -> i64;
    fn max_repos_per_run(&self) -> usize;

    fn readme_path(&self) -> &str;
    fn processed_file(&self) -> &str;
    fn keep_existing_rows(&self) -> bool;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<ExtractResult>;
    async fn transform(&self, data: ExtractResult) -> Result<UpdateBatch>;
    async fn load(&self, batch: UpdateBatch) -> Result<String>;
}
