//! Per-filter summaries.

use crate::data::Table;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Result of one QC filter with statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Filter name.
    pub filter: String,
    /// Number of features before filtering.
    pub n_before: usize,
    /// Number of features after filtering.
    pub n_after: usize,
    /// Identifiers of the removed features.
    pub removed: Vec<String>,
    /// Proportion of features retained.
    pub retention_rate: f64,
}

impl FilterReport {
    /// Number of features removed.
    pub fn n_removed(&self) -> usize {
        self.removed.len()
    }
}

impl std::fmt::Display for FilterReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{} filter", self.filter)?;
        writeln!(f, "  Before:    {} features", self.n_before)?;
        writeln!(f, "  After:     {} features", self.n_after)?;
        writeln!(f, "  Removed:   {} features", self.n_removed())?;
        writeln!(f, "  Retained:  {:.1}%", self.retention_rate * 100.0)?;
        Ok(())
    }
}

/// Drop the columns at `positions` and summarise what was removed.
pub(crate) fn drop_features(
    table: &Table,
    positions: &[usize],
    filter: &str,
) -> Result<(Table, FilterReport)> {
    let n_before = table.n_features();
    let removed: Vec<String> = positions
        .iter()
        .map(|&i| table.columns()[i].name().to_string())
        .collect();
    for name in &removed {
        log::debug!("{} filter dropped {}", filter, name);
    }

    let names: Vec<&str> = removed.iter().map(String::as_str).collect();
    let filtered = table.drop_columns(&names)?;
    let n_after = filtered.n_features();
    if n_after == 0 && n_before > 0 {
        log::warn!("{} filter removed every feature", filter);
    }
    log::info!(
        "{} filter: {} -> {} features ({} removed)",
        filter,
        n_before,
        n_after,
        removed.len()
    );

    let report = FilterReport {
        filter: filter.to_string(),
        n_before,
        n_after,
        removed,
        retention_rate: if n_before > 0 {
            n_after as f64 / n_before as f64
        } else {
            1.0
        },
    };
    Ok((filtered, report))
}
