//! The QC filter chain: blank, then zero proportion, then CV.

use crate::data::Table;
use crate::error::Result;
use crate::filter::blank::{filter_blank_with_report, BlankOperator};
use crate::filter::cv::{filter_cv_with_report, CvOperator};
use crate::filter::group::QcGroup;
use crate::filter::report::FilterReport;
use crate::filter::zero::filter_zero_proportion_with_report;
use serde::{Deserialize, Serialize};

fn default_blank_group() -> QcGroup {
    QcGroup::column_in("SampleType", ["blank"])
}

fn default_zero_threshold() -> f64 {
    0.75
}

fn default_cv_threshold() -> f64 {
    20.0
}

/// Settings of the blank filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlankFilterConfig {
    /// Rows holding blank injections.
    #[serde(default = "default_blank_group")]
    pub group: QcGroup,
    #[serde(default)]
    pub operator: BlankOperator,
    #[serde(default)]
    pub threshold: f64,
}

impl Default for BlankFilterConfig {
    fn default() -> Self {
        Self {
            group: default_blank_group(),
            operator: BlankOperator::NotEqual,
            threshold: 0.0,
        }
    }
}

/// Settings of the zero-proportion filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroFilterConfig {
    #[serde(default = "default_zero_threshold")]
    pub threshold: f64,
}

impl Default for ZeroFilterConfig {
    fn default() -> Self {
        Self {
            threshold: default_zero_threshold(),
        }
    }
}

/// Settings of the CV filter. The replicate group has no default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvFilterConfig {
    /// Replicate QC injections.
    pub group: QcGroup,
    #[serde(default = "default_cv_threshold")]
    pub threshold: f64,
    #[serde(default)]
    pub operator: CvOperator,
}

impl CvFilterConfig {
    pub fn new(group: QcGroup) -> Self {
        Self {
            group,
            threshold: default_cv_threshold(),
            operator: CvOperator::LessEqual,
        }
    }
}

/// Settings of the whole chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcConfig {
    #[serde(default)]
    pub blank: BlankFilterConfig,
    #[serde(default)]
    pub zero: ZeroFilterConfig,
    pub cv: CvFilterConfig,
}

impl QcConfig {
    /// Default blank and zero settings with the given CV replicate group.
    pub fn new(cv_group: QcGroup) -> Self {
        Self {
            blank: BlankFilterConfig::default(),
            zero: ZeroFilterConfig::default(),
            cv: CvFilterConfig::new(cv_group),
        }
    }
}

/// Apply the three filters in their fixed order.
///
/// Each filter only sees the feature columns that survived the previous one.
/// Returns the filtered table and one report per filter.
pub fn apply_qc_chain(table: &Table, config: &QcConfig) -> Result<(Table, Vec<FilterReport>)> {
    let (table, blank) = filter_blank_with_report(
        table,
        &config.blank.group,
        config.blank.operator,
        config.blank.threshold,
    )?;
    let (table, zero) = filter_zero_proportion_with_report(&table, config.zero.threshold)?;
    let (table, cv) = filter_cv_with_report(
        &table,
        &config.cv.group,
        config.cv.threshold,
        config.cv.operator,
    )?;
    Ok((table, vec![blank, zero, cv]))
}
