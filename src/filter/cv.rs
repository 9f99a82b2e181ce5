//! Coefficient-of-variation filtering over replicate QC injections.

use crate::data::Table;
use crate::error::{QcError, Result};
use crate::filter::group::QcGroup;
use crate::filter::report::{drop_features, FilterReport};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use std::str::FromStr;

/// Direction of the CV comparison. Columns satisfying it are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CvOperator {
    /// Drop columns with `cv <= threshold`.
    #[default]
    #[serde(rename = "<=", alias = "≤")]
    LessEqual,
    /// Drop columns with `cv >= threshold`.
    #[serde(rename = ">=", alias = "≥")]
    GreaterEqual,
}

impl CvOperator {
    /// Whether `cv <op> threshold` holds.
    pub fn holds(self, cv: f64, threshold: f64) -> bool {
        match self {
            CvOperator::LessEqual => cv <= threshold,
            CvOperator::GreaterEqual => cv >= threshold,
        }
    }
}

impl FromStr for CvOperator {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "<=" | "≤" => Ok(CvOperator::LessEqual),
            ">=" | "≥" => Ok(CvOperator::GreaterEqual),
            other => Err(QcError::InvalidArguments(format!(
                "Unsupported operation '{}'. Supported operations are '<=' and '>='",
                other
            ))),
        }
    }
}

/// Coefficient of variation in percent: `100 * sd / mean`.
///
/// Uses the sample standard deviation (n - 1 denominator). Returns `None`
/// when fewer than two values are given or the mean is not finite or too
/// close to zero to divide by.
pub fn coefficient_of_variation(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let mean = values.iter().mean();
    if !mean.is_finite() || mean.abs() < f64::EPSILON {
        return None;
    }
    let cv = 100.0 * values.iter().std_dev() / mean;
    cv.is_finite().then_some(cv)
}

/// Drop feature columns whose CV across the `group` rows satisfies
/// `operator` against `threshold`.
///
/// Missing cells are skipped. Columns with an undefined CV are kept.
///
/// # Arguments
/// * `table` - The sample-by-feature table
/// * `group` - Replicate QC injections used as evidence
/// * `threshold` - CV threshold in percent
/// * `operator` - Comparison that marks a column for removal
pub fn filter_cv(
    table: &Table,
    group: &QcGroup,
    threshold: f64,
    operator: CvOperator,
) -> Result<Table> {
    filter_cv_with_report(table, group, threshold, operator).map(|(t, _)| t)
}

/// [`filter_cv`] returning statistics about what was filtered.
pub fn filter_cv_with_report(
    table: &Table,
    group: &QcGroup,
    threshold: f64,
    operator: CvOperator,
) -> Result<(Table, FilterReport)> {
    if !threshold.is_finite() {
        return Err(QcError::InvalidArguments(
            "CV threshold must be a finite number".to_string(),
        ));
    }
    let rows = group.rows(table)?;
    log::debug!("CV group [{}] selected {} rows", group, rows.len());

    let decisions: Vec<(usize, Option<f64>)> = table
        .columns()
        .par_iter()
        .enumerate()
        .filter(|(_, col)| col.is_feature())
        .map(|(i, col)| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|&r| col.values()[r].as_number())
                .collect();
            (i, coefficient_of_variation(&values))
        })
        .collect();

    let undefined = decisions.iter().filter(|(_, cv)| cv.is_none()).count();
    if undefined > 0 {
        log::warn!(
            "{} features have an undefined CV in the QC group and are kept",
            undefined
        );
    }

    let drop: Vec<usize> = decisions
        .into_iter()
        .filter_map(|(i, cv)| match cv {
            Some(cv) if operator.holds(cv, threshold) => Some(i),
            _ => None,
        })
        .collect();

    drop_features(table, &drop, "CV")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Cell, Column, RowIndex};

    fn matrix() -> Table {
        let index = RowIndex::new(
            "sample_name",
            vec!["QC1".into(), "QC2".into(), "QC3".into(), "S1".into()],
        )
        .unwrap();
        Table::with_index(
            index,
            vec![
                Column::feature(
                    "stable",
                    vec![100.0.into(), 101.0.into(), 99.0.into(), 5000.0.into()],
                ),
                Column::feature("noisy", vec![50.0.into(), 100.0.into(), 150.0.into(), 1.0.into()]),
                Column::feature("absent", vec![0.0.into(), 0.0.into(), 0.0.into(), 3.0.into()]),
                Column::feature(
                    "sparse",
                    vec![Cell::Missing, 4.0.into(), Cell::Missing, 3.0.into()],
                ),
                Column::new("batch", vec![1.0.into(), 1.0.into(), 1.0.into(), 2.0.into()]),
            ],
        )
        .unwrap()
    }

    fn qc() -> QcGroup {
        QcGroup::samples(["QC1", "QC2", "QC3"])
    }

    #[test]
    fn test_coefficient_of_variation() {
        let cv = coefficient_of_variation(&[100.0, 101.0, 99.0]).unwrap();
        assert!((cv - 1.0).abs() < 1e-9);
        let cv = coefficient_of_variation(&[50.0, 100.0, 150.0]).unwrap();
        assert!((cv - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_cv() {
        assert_eq!(coefficient_of_variation(&[]), None);
        assert_eq!(coefficient_of_variation(&[4.0]), None);
        assert_eq!(coefficient_of_variation(&[0.0, 0.0, 0.0]), None);
        assert_eq!(coefficient_of_variation(&[-1.0, 1.0]), None);
    }

    #[test]
    fn test_near_zero_mean_is_undefined() {
        assert_eq!(coefficient_of_variation(&[1e-18, 3e-18]), None);
        assert_eq!(coefficient_of_variation(&[0.1 + 0.2 - 0.3, 0.0]), None);
        assert!(coefficient_of_variation(&[1e-3, 3e-3]).is_some());
    }

    #[test]
    fn test_less_equal_drops_stable() {
        let (out, report) =
            filter_cv_with_report(&matrix(), &qc(), 10.0, CvOperator::LessEqual).unwrap();
        assert_eq!(out.feature_names(), vec!["noisy", "absent", "sparse"]);
        assert_eq!(report.removed, vec!["stable"]);
        assert!(out.has_column("batch"));
    }

    #[test]
    fn test_greater_equal_drops_noisy() {
        let out = filter_cv(&matrix(), &qc(), 20.0, CvOperator::GreaterEqual).unwrap();
        assert_eq!(out.feature_names(), vec!["stable", "absent", "sparse"]);
    }

    #[test]
    fn test_only_group_rows_are_used() {
        // S1 would make "stable" highly variable if it were included.
        let out = filter_cv(&matrix(), &qc(), 10.0, CvOperator::LessEqual).unwrap();
        assert!(!out.has_column("stable"));
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("≤".parse::<CvOperator>().unwrap(), CvOperator::LessEqual);
        assert_eq!(">=".parse::<CvOperator>().unwrap(), CvOperator::GreaterEqual);
        assert!(matches!(
            "!=".parse::<CvOperator>(),
            Err(QcError::InvalidArguments(_))
        ));
    }
}
