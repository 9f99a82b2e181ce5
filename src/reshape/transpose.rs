//! Pivot a feature table so samples become rows and features become columns.

use crate::data::{Cell, Column, RowIndex, Table};
use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Name of the row index produced by [`transpose`].
pub const SAMPLE_INDEX_NAME: &str = "sample_name";

/// How to treat repeated key values when pivoting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with `AmbiguousKey` on the first repeated key.
    #[default]
    Fail,
    /// Keep the first occurrence as is and suffix later ones `_2`, `_3`, ...
    Suffix,
}

/// Transpose `table` around `key_column`, failing on duplicate keys.
///
/// Output rows are the original columns (minus the key), indexed by
/// [`SAMPLE_INDEX_NAME`]; output columns are the key values and are marked
/// as feature columns.
pub fn transpose(table: &Table, key_column: &str) -> Result<Table> {
    transpose_with(table, key_column, DuplicatePolicy::Fail)
}

/// Transpose `table` around `key_column` with an explicit duplicate policy.
pub fn transpose_with(table: &Table, key_column: &str, policy: DuplicatePolicy) -> Result<Table> {
    let key_cells = table.resolve(key_column)?;
    let keys = unique_keys(key_cells.iter().map(Cell::to_string).collect(), policy)?;

    let sources: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| c.name() != key_column)
        .collect();
    let sample_names: Vec<String> = sources.iter().map(|c| c.name().to_string()).collect();
    let index = RowIndex::new(SAMPLE_INDEX_NAME, sample_names)?;

    let columns: Vec<Column> = keys
        .into_iter()
        .enumerate()
        .map(|(row, key)| {
            let values = sources.iter().map(|c| c.values()[row].clone()).collect();
            Column::feature(key, values)
        })
        .collect();

    log::info!(
        "Transposed {} features x {} samples",
        columns.len(),
        index.keys().len()
    );
    Table::with_index(index, columns)
}

fn unique_keys(keys: Vec<String>, policy: DuplicatePolicy) -> Result<Vec<String>> {
    let mut seen: HashSet<String> = HashSet::with_capacity(keys.len());
    let mut out = Vec::with_capacity(keys.len());

    for key in keys {
        if seen.insert(key.clone()) {
            out.push(key);
            continue;
        }
        match policy {
            DuplicatePolicy::Fail => {
                return Err(QcError::AmbiguousKey {
                    context: "feature identifiers".to_string(),
                    key,
                })
            }
            DuplicatePolicy::Suffix => {
                let mut n = 2;
                let renamed = loop {
                    let candidate = format!("{}_{}", key, n);
                    if !seen.contains(&candidate) {
                        break candidate;
                    }
                    n += 1;
                };
                log::warn!("Duplicate feature identifier '{}' renamed to '{}'", key, renamed);
                seen.insert(renamed.clone());
                out.push(renamed);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_delimited;

    fn feature_table() -> Table {
        parse_delimited("metabolite;S1;S2;S3\nM100T1.5;1;2;3\nM200T2.5;4;5;6\n", ';').unwrap()
    }

    #[test]
    fn test_transpose_shape() {
        let t = transpose(&feature_table(), "metabolite").unwrap();
        assert_eq!(t.index().unwrap().name(), SAMPLE_INDEX_NAME);
        assert_eq!(t.row_keys().unwrap(), &["S1", "S2", "S3"]);
        assert_eq!(t.column_names(), vec!["M100T1.5", "M200T2.5"]);
        assert_eq!(t.n_features(), 2);
        assert_eq!(t.get_by_key("S2", "M200T2.5"), Some(&Cell::Number(5.0)));
    }

    #[test]
    fn test_transpose_twice_restores_cells() {
        let original = feature_table();
        let once = transpose(&original, "metabolite").unwrap();
        let twice = transpose(&once.reset_index(), SAMPLE_INDEX_NAME).unwrap();

        assert_eq!(twice.row_keys().unwrap(), &["M100T1.5", "M200T2.5"]);
        for (row, key) in twice.row_keys().unwrap().iter().enumerate() {
            for sample in ["S1", "S2", "S3"] {
                assert_eq!(
                    twice.get_by_key(key, sample),
                    original.get(row, sample),
                    "cell {} / {}",
                    key,
                    sample
                );
            }
        }
    }

    #[test]
    fn test_duplicate_keys_fail() {
        let table = parse_delimited("metabolite;S1\nM1T1.0;1\nM1T1.0;2\n", ';').unwrap();
        let err = transpose(&table, "metabolite").unwrap_err();
        assert!(matches!(err, QcError::AmbiguousKey { key, .. } if key == "M1T1.0"));
    }

    #[test]
    fn test_duplicate_keys_suffix() {
        let table = parse_delimited("metabolite;S1\nM1T1.0;1\nM1T1.0;2\nM1T1.0;3\n", ';').unwrap();
        let t = transpose_with(&table, "metabolite", DuplicatePolicy::Suffix).unwrap();
        assert_eq!(t.column_names(), vec!["M1T1.0", "M1T1.0_2", "M1T1.0_3"]);
        assert_eq!(t.get_by_key("S1", "M1T1.0_3"), Some(&Cell::Number(3.0)));
    }

    #[test]
    fn test_missing_key_column() {
        assert!(matches!(
            transpose(&feature_table(), "nope"),
            Err(QcError::MissingColumn(_))
        ));
    }
}
