use crate::core::{Pipeline, UpdateBatch};
use crate::utils::error::Result;
use crate::utils::monitor::RunMonitor;

pub struct UpdateEngine<P: Pipeline> {
    pipeline: P,
    monitor: RunMonitor,
}

impl<P: Pipeline> UpdateEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: RunMonitor::new(monitor_enabled),
        }
    }

    /// Search, build rows, then write the README and ledger.
    pub async fn run(&self) -> Result<String> {
        let batch = self.collect().await?;

        tracing::info!("Writing results...");
        let summary = self.pipeline.load(batch).await?;
        self.monitor.log_stats("Load");
        self.monitor.log_final_stats();

        Ok(summary)
    }

    /// Same as [`run`](Self::run) without the write step.
    pub async fn run_dry(&self) -> Result<UpdateBatch> {
        let batch = self.collect().await?;
        self.monitor.log_final_stats();
        Ok(batch)
    }

    async fn collect(&self) -> Result<UpdateBatch> {
        tracing::info!("Searching repositories...");
        let extracted = self.pipeline.extract().await?;
        tracing::info!(
            "Found {} repositories, {} new",
            extracted.total_found,
            extracted.candidates.len()
        );
        self.monitor.log_stats("Extract");

        tracing::info!("Reading READMEs...");
        let batch = self.pipeline.transform(extracted).await?;
        tracing::info!("Built {} paper rows", batch.rows.len());
        self.monitor.log_stats("Transform");

        Ok(batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ExtractResult;
    use crate::domain::model::{PaperInfo, PaperRow};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingPipeline {
        loads: AtomicUsize,
    }

    #[async_trait]
    impl Pipeline for CountingPipeline {
        async fn extract(&self) -> Result<ExtractResult> {
            Ok(ExtractResult {
                total_found: 3,
                ..Default::default()
            })
        }

        async fn transform(&self, _data: ExtractResult) -> Result<UpdateBatch> {
            Ok(UpdateBatch {
                rows: vec![PaperRow {
                    paper: PaperInfo {
                        title: "T".into(),
                        authors: "A".into(),
                        venue: "IROS".into(),
                        year: "2020".into(),
                        paper_url: "P".into(),
                    },
                    repo_full_name: "o/r".into(),
                    repo_url: "https://github.com/o/r".into(),
                }],
                processed: vec!["o/r".into()],
                known_processed: vec![],
            })
        }

        async fn load(&self, batch: UpdateBatch) -> Result<String> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(format!("{} rows", batch.rows.len()))
        }
    }

    #[tokio::test]
    async fn test_run_calls_all_phases() {
        let engine = UpdateEngine::new(CountingPipeline::default());
        let summary = engine.run().await.unwrap();
        assert_eq!(summary, "1 rows");
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dry_run_skips_load() {
        let engine = UpdateEngine::new_with_monitoring(CountingPipeline::default(), true);
        let batch = engine.run_dry().await.unwrap();
        assert_eq!(batch.processed, ["o/r"]);
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
