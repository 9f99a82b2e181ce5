//! Metabolomics feature-table quality control
//!
//! This library curates untargeted-metabolomics feature tables (one row per
//! mass/retention-time feature, one column per injection) into
//! sample-by-metabolite matrices ready for downstream statistics.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Table model, delimited and spreadsheet loading, conflict-aware saving
//! - **reshape**: Feature identifiers, column projection, transposition,
//!   row selection and metadata merging
//! - **filter**: QC filters (blank, zero proportion, coefficient of variation)
//! - **pipeline**: YAML-configured curation of one dataset
//!
//! # Example
//!
//! ```no_run
//! use metabo_qc::prelude::*;
//!
//! let config = PipelineConfig::from_yaml_file("pos.yaml").unwrap();
//! let summary = Pipeline::new(config).run().unwrap();
//! for report in &summary.reports {
//!     println!("{}", report);
//! }
//! ```

pub mod data;
pub mod error;
pub mod filter;
pub mod pipeline;
pub mod reshape;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        read_table, save_table, Cell, Column, ColumnRole, ConflictPolicy, OutputConfig, RowIndex,
        SaveOutcome, Table, TableSource, TextEncoding,
    };
    pub use crate::error::{QcError, Result};
    pub use crate::filter::{
        apply_qc_chain, coefficient_of_variation, filter_blank, filter_cv,
        filter_zero_proportion, zero_proportion, BlankOperator, CvOperator, FilterReport,
        QcConfig, QcGroup,
    };
    pub use crate::pipeline::{MergeOrder, Pipeline, PipelineConfig, Polarity, RunSummary};
    pub use crate::reshape::{
        add_feature_ids, feature_id, merge, project, select_feature_columns, select_rows,
        transpose, transpose_with, CompareOp, DuplicatePolicy, Predicate,
    };
}
