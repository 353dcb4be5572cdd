pub mod paper_pipeline;
