pub mod etl;
pub mod ledger;
pub mod paper_table;
pub mod readme_parser;

pub use crate::app::pipelines::paper_pipeline::PaperPipeline;
pub use crate::domain::model::{ExtractResult, PaperInfo, PaperRow, RepoSummary, UpdateBatch};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
