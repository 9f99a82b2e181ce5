//! Configuration and execution of a dataset curation run.

mod config;
mod runner;

pub use config::{MergeOrder, PipelineConfig, Polarity};
pub use runner::{Pipeline, QcRun, RunSummary};
