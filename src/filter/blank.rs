//! Blank-based filtering: drop features seen in blank injections.

use crate::data::Table;
use crate::error::{QcError, Result};
use crate::filter::group::QcGroup;
use crate::filter::report::{drop_features, FilterReport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Comparison applied between blank-row values and the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlankOperator {
    #[default]
    #[serde(rename = "!=", alias = "≠")]
    NotEqual,
    #[serde(rename = "<=", alias = "≤")]
    LessEqual,
    #[serde(rename = ">=", alias = "≥")]
    GreaterEqual,
    #[serde(rename = "=", alias = "==")]
    Equal,
}

impl BlankOperator {
    /// Whether `value <op> threshold` holds.
    pub fn holds(self, value: f64, threshold: f64) -> bool {
        match self {
            BlankOperator::NotEqual => value != threshold,
            BlankOperator::LessEqual => value <= threshold,
            BlankOperator::GreaterEqual => value >= threshold,
            BlankOperator::Equal => value == threshold,
        }
    }
}

impl FromStr for BlankOperator {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "!=" | "≠" => Ok(BlankOperator::NotEqual),
            "<=" | "≤" => Ok(BlankOperator::LessEqual),
            ">=" | "≥" => Ok(BlankOperator::GreaterEqual),
            "=" | "==" => Ok(BlankOperator::Equal),
            other => Err(QcError::InvalidArguments(format!(
                "Unsupported operation '{}'. Supported operations are '!=', '<=', '>=', and '='",
                other
            ))),
        }
    }
}

/// Drop every feature column for which `value <op> threshold` holds in at
/// least one row of the blank `group`.
///
/// Only feature columns are evaluated. Missing and non-numeric cells never
/// satisfy the comparison, `!=` included: a blank with no recorded value does
/// not count as a detection. With the default `!=` and threshold `0`, any
/// feature detected in any blank is removed.
pub fn filter_blank(
    table: &Table,
    group: &QcGroup,
    operator: BlankOperator,
    threshold: f64,
) -> Result<Table> {
    filter_blank_with_report(table, group, operator, threshold).map(|(t, _)| t)
}

/// [`filter_blank`] returning statistics about what was filtered.
pub fn filter_blank_with_report(
    table: &Table,
    group: &QcGroup,
    operator: BlankOperator,
    threshold: f64,
) -> Result<(Table, FilterReport)> {
    let rows = group.rows(table)?;
    log::debug!("Blank group [{}] selected {} rows", group, rows.len());

    let drop: Vec<usize> = table
        .columns()
        .par_iter()
        .enumerate()
        .filter(|(_, col)| col.is_feature())
        .filter(|(_, col)| {
            rows.iter().any(|&r| {
                col.values()[r]
                    .as_number()
                    .map_or(false, |v| operator.holds(v, threshold))
            })
        })
        .map(|(i, _)| i)
        .collect();

    drop_features(table, &drop, "Blank")
}
