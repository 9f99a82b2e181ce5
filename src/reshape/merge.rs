//! Outer join of two indexed tables on their row keys.

use crate::data::{Cell, Column, RowIndex, Table};
use crate::error::{QcError, Result};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Outer-join `left` and `right` on row-key equality.
///
/// Both tables must carry a row index. The result holds the union of row
/// keys (sorted) and the union of columns (`left` first). Cells with no
/// counterpart become [`Cell::Missing`], never zero. Column names present on
/// both sides are suffixed `_x` (left) and `_y` (right).
pub fn merge(left: &Table, right: &Table) -> Result<Table> {
    let (left_idx, right_idx) = match (left.index(), right.index()) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            return Err(QcError::InvalidArguments(
                "merge requires both tables to be indexed by sample name".to_string(),
            ))
        }
    };

    let keys: Vec<String> = left_idx
        .keys()
        .iter()
        .chain(right_idx.keys())
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let left_pos = positions_by_key(left_idx);
    let right_pos = positions_by_key(right_idx);

    let left_names: HashSet<&str> = left.column_names().into_iter().collect();
    let right_names: HashSet<&str> = right.column_names().into_iter().collect();

    let mut columns = Vec::with_capacity(left.n_columns() + right.n_columns());
    for col in left.columns() {
        let name = if right_names.contains(col.name()) {
            format!("{}_x", col.name())
        } else {
            col.name().to_string()
        };
        columns.push(realign(col, name, &keys, &left_pos));
    }
    for col in right.columns() {
        let name = if left_names.contains(col.name()) {
            format!("{}_y", col.name())
        } else {
            col.name().to_string()
        };
        columns.push(realign(col, name, &keys, &right_pos));
    }

    let unmatched = keys
        .iter()
        .filter(|k| !left_pos.contains_key(k.as_str()) || !right_pos.contains_key(k.as_str()))
        .count();
    if unmatched > 0 {
        log::warn!("{} samples present on only one side of the merge", unmatched);
    }

    let index = RowIndex::new(left_idx.name(), keys)?;
    Table::with_index(index, columns)
}

fn positions_by_key(index: &RowIndex) -> HashMap<&str, usize> {
    index
        .keys()
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect()
}

fn realign(col: &Column, name: String, keys: &[String], pos: &HashMap<&str, usize>) -> Column {
    let values: Vec<Cell> = keys
        .iter()
        .map(|k| match pos.get(k.as_str()) {
            Some(&row) => col.values()[row].clone(),
            None => Cell::Missing,
        })
        .collect();
    if col.is_feature() {
        Column::feature(name, values)
    } else {
        Column::new(name, values)
    }
}
