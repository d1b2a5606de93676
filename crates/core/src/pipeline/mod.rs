pub mod batch_context;
pub mod batch_discovery;
pub mod batch_pipeline;
pub mod batch_report;
pub mod config;
pub mod pipeline_logger;
pub mod pipeline_state;
