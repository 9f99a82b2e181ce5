//! QC filters over feature columns of a sample-by-feature table.
//!
//! Every filter evaluates feature columns only; metadata columns merged into
//! the table are never candidates for removal.

pub mod blank;
pub mod chain;
pub mod cv;
pub mod group;
pub mod report;
pub mod zero;

pub use blank::{filter_blank, filter_blank_with_report, BlankOperator};
pub use chain::{apply_qc_chain, BlankFilterConfig, CvFilterConfig, QcConfig, ZeroFilterConfig};
pub use cv::{coefficient_of_variation, filter_cv, filter_cv_with_report, CvOperator};
pub use group::QcGroup;
pub use report::FilterReport;
pub use zero::{filter_zero_proportion, filter_zero_proportion_with_report, zero_proportion};
