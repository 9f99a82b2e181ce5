//! Zero-proportion filtering.

use crate::data::{Column, Table};
use crate::error::{QcError, Result};
use crate::filter::report::{drop_features, FilterReport};
use rayon::prelude::*;

/// Fraction of the values in `column` that are exactly zero.
///
/// Missing cells count as non-zero. An empty column has proportion 0.
pub fn zero_proportion(column: &Column) -> f64 {
    if column.is_empty() {
        return 0.0;
    }
    let zeros = column.values().iter().filter(|c| c.is_zero()).count();
    zeros as f64 / column.len() as f64
}

/// Drop feature columns whose zero proportion over all rows is at least
/// `threshold`.
///
/// # Arguments
/// * `table` - The sample-by-feature table
/// * `threshold` - Proportion in `[0, 1]`
pub fn filter_zero_proportion(table: &Table, threshold: f64) -> Result<Table> {
    filter_zero_proportion_with_report(table, threshold).map(|(t, _)| t)
}

/// [`filter_zero_proportion`] returning statistics about what was filtered.
pub fn filter_zero_proportion_with_report(
    table: &Table,
    threshold: f64,
) -> Result<(Table, FilterReport)> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(QcError::InvalidArguments(
            "Zero-proportion threshold must be between 0 and 1".to_string(),
        ));
    }
    if table.n_rows() == 0 {
        log::warn!("Zero-proportion filter applied to a table without rows");
    }

    let drop: Vec<usize> = table
        .columns()
        .par_iter()
        .enumerate()
        .filter(|(_, col)| col.is_feature() && !col.is_empty())
        .filter(|(_, col)| zero_proportion(col) >= threshold)
        .map(|(i, _)| i)
        .collect();

    drop_features(table, &drop, "Zero-proportion")
}
