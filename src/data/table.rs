//! Column-oriented table with an optional unique row index.

use crate::data::cell::Cell;
use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Role of a column within a feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnRole {
    /// Feature abundance column (candidate for QC filtering).
    Feature,
    /// Any other column: coordinates, identifiers, sample metadata.
    Attribute,
}

/// A named column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    role: ColumnRole,
    values: Vec<Cell>,
    /// Verbatim field text of a column loaded as numeric, so identifiers
    /// such as `001` or `101` survive as row keys.
    source: Option<Vec<String>>,
}

impl Column {
    /// Create an attribute column.
    pub fn new(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Attribute,
            values,
            source: None,
        }
    }

    /// Create a feature abundance column.
    pub fn feature(name: impl Into<String>, values: Vec<Cell>) -> Self {
        Self {
            name: name.into(),
            role: ColumnRole::Feature,
            values,
            source: None,
        }
    }

    /// Column name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column role.
    #[inline]
    pub fn role(&self) -> ColumnRole {
        self.role
    }

    /// Whether this is a feature abundance column.
    #[inline]
    pub fn is_feature(&self) -> bool {
        self.role == ColumnRole::Feature
    }

    /// Cell values, one per row.
    #[inline]
    pub fn values(&self) -> &[Cell] {
        &self.values
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the column has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Text of the cell at `row` as it should appear in a row key.
    pub fn key_text(&self, row: usize) -> String {
        match &self.source {
            Some(text) => text[row].clone(),
            None => self.values[row].to_string(),
        }
    }

    fn renamed(&self, name: String) -> Self {
        Self {
            name,
            ..self.clone()
        }
    }

    fn take(&self, rows: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            role: self.role,
            values: rows.iter().map(|&r| self.values[r].clone()).collect(),
            source: self
                .source
                .as_ref()
                .map(|text| rows.iter().map(|&r| text[r].clone()).collect()),
        }
    }
}

/// Named row index with unique keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIndex {
    name: String,
    keys: Vec<String>,
}

impl RowIndex {
    /// Create an index, rejecting duplicate keys.
    pub fn new(name: impl Into<String>, keys: Vec<String>) -> Result<Self> {
        let name = name.into();
        let mut seen = HashSet::with_capacity(keys.len());
        for key in &keys {
            if !seen.insert(key.as_str()) {
                return Err(QcError::AmbiguousKey {
                    context: format!("row index '{}'", name),
                    key: key.clone(),
                });
            }
        }
        Ok(Self { name, keys })
    }

    /// Index name (e.g. `sample_name`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Row keys in row order.
    #[inline]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Position of a key.
    pub fn position(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}

/// An immutable table of named columns.
///
/// Every operation returns a new `Table`; the input is never modified.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    index: Option<RowIndex>,
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    /// Create a table from columns of equal length.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        Self::with_rows(None, columns, n_rows)
    }

    /// Create a table with a row index. Index keys must be unique.
    pub fn with_index(index: RowIndex, columns: Vec<Column>) -> Result<Self> {
        let n_rows = index.keys.len();
        Self::with_rows(Some(index), columns, n_rows)
    }

    fn with_rows(index: Option<RowIndex>, columns: Vec<Column>, n_rows: usize) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if col.len() != n_rows {
                return Err(QcError::DimensionMismatch {
                    expected: n_rows,
                    actual: col.len(),
                });
            }
            if !seen.insert(col.name.as_str()) {
                return Err(QcError::AmbiguousKey {
                    context: "column names".to_string(),
                    key: col.name.clone(),
                });
            }
        }
        Ok(Self {
            index,
            columns,
            n_rows,
        })
    }

    /// Build a table from a header and string records.
    ///
    /// Column types are inferred per column: if every non-missing value parses
    /// as a number the column is numeric, otherwise all values are kept as text.
    /// Numeric columns remember their field text for use as row keys.
    pub fn from_records(header: Vec<String>, records: Vec<Vec<String>>) -> Result<Self> {
        if header.is_empty() {
            return Err(QcError::EmptyData("Table has no header".to_string()));
        }
        let columns = header
            .into_iter()
            .enumerate()
            .map(|(col_idx, name)| {
                let parsed: Vec<Cell> = records
                    .iter()
                    .map(|r| r.get(col_idx).map(|v| Cell::parse(v)).unwrap_or(Cell::Missing))
                    .collect();
                let all_numeric = parsed
                    .iter()
                    .all(|c| matches!(c, Cell::Number(_) | Cell::Missing));
                if all_numeric {
                    let source = records
                        .iter()
                        .map(|r| {
                            r.get(col_idx)
                                .map(|v| v.trim().to_string())
                                .unwrap_or_default()
                        })
                        .collect();
                    return Column {
                        name,
                        role: ColumnRole::Attribute,
                        values: parsed,
                        source: Some(source),
                    };
                }
                let values = parsed
                    .into_iter()
                    .zip(records.iter())
                    .map(|(c, r)| match c {
                        Cell::Number(_) => Cell::Text(r[col_idx].clone()),
                        other => other,
                    })
                    .collect();
                Column::new(name, values)
            })
            .collect();
        Self::with_rows(None, columns, records.len())
    }

    /// Number of rows.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns (excluding the index).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// All columns in order.
    #[inline]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Row index, if set.
    #[inline]
    pub fn index(&self) -> Option<&RowIndex> {
        self.index.as_ref()
    }

    /// Row keys, if an index is set.
    pub fn row_keys(&self) -> Option<&[String]> {
        self.index.as_ref().map(RowIndex::keys)
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Position of a column by name.
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Check if a column exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column_position(name).is_some()
    }

    /// Names of feature abundance columns.
    pub fn feature_names(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_feature())
            .map(Column::name)
            .collect()
    }

    /// Number of feature abundance columns.
    pub fn n_features(&self) -> usize {
        self.columns.iter().filter(|c| c.is_feature()).count()
    }

    /// Get a cell by row position and column name.
    pub fn get(&self, row: usize, column: &str) -> Option<&Cell> {
        self.column(column).and_then(|c| c.values.get(row))
    }

    /// Get a cell by row key and column name.
    pub fn get_by_key(&self, key: &str, column: &str) -> Option<&Cell> {
        let row = self.index.as_ref()?.position(key)?;
        self.get(row, column)
    }

    /// Cells of a column, or the index keys rendered as text when `name` is
    /// the index name.
    pub fn resolve(&self, name: &str) -> Result<Vec<Cell>> {
        if let Some(col) = self.column(name) {
            return Ok(col.values.clone());
        }
        match &self.index {
            Some(idx) if idx.name == name => {
                Ok(idx.keys.iter().map(|k| Cell::Text(k.clone())).collect())
            }
            _ => Err(QcError::MissingColumn(name.to_string())),
        }
    }

    /// Append a column, returning a new table.
    pub fn with_column(&self, column: Column) -> Result<Self> {
        let mut columns = self.columns.clone();
        columns.push(column);
        Self::with_rows(self.index.clone(), columns, self.n_rows)
    }

    /// Use a column as the row index, removing it from the columns.
    pub fn set_index(&self, column: &str) -> Result<Self> {
        let pos = self
            .column_position(column)
            .ok_or_else(|| QcError::MissingColumn(column.to_string()))?;
        let key_column = &self.columns[pos];
        let keys = (0..self.n_rows).map(|row| key_column.key_text(row)).collect();
        let index = RowIndex::new(column, keys)?;
        let columns = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != pos)
            .map(|(_, c)| c.clone())
            .collect();
        Self::with_index(index, columns)
    }

    /// Move the row index back into a leading text column.
    pub fn reset_index(&self) -> Self {
        match &self.index {
            None => self.clone(),
            Some(idx) => {
                let mut columns = Vec::with_capacity(self.columns.len() + 1);
                columns.push(Column::new(
                    idx.name.clone(),
                    idx.keys.iter().map(|k| Cell::Text(k.clone())).collect(),
                ));
                columns.extend(self.columns.iter().cloned());
                Self {
                    index: None,
                    columns,
                    n_rows: self.n_rows,
                }
            }
        }
    }

    /// Subset to the given column positions, in the given order.
    pub fn take_columns(&self, positions: &[usize]) -> Result<Self> {
        let mut columns = Vec::with_capacity(positions.len());
        for &pos in positions {
            let col = self.columns.get(pos).ok_or_else(|| {
                QcError::InvalidArguments(format!("Column position {} out of bounds", pos))
            })?;
            columns.push(col.clone());
        }
        Self::with_rows(self.index.clone(), columns, self.n_rows)
    }

    /// Subset to the given row positions, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Result<Self> {
        if let Some(&bad) = rows.iter().find(|&&r| r >= self.n_rows) {
            return Err(QcError::InvalidArguments(format!(
                "Row position {} out of bounds",
                bad
            )));
        }
        let index = match &self.index {
            Some(idx) => Some(RowIndex::new(
                idx.name.clone(),
                rows.iter().map(|&r| idx.keys[r].clone()).collect(),
            )?),
            None => None,
        };
        let columns = self.columns.iter().map(|c| c.take(rows)).collect();
        Self::with_rows(index, columns, rows.len())
    }

    /// Drop the named columns, keeping the rest in order.
    pub fn drop_columns(&self, names: &[&str]) -> Result<Self> {
        let drop: HashSet<&str> = names.iter().copied().collect();
        let keep: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !drop.contains(c.name.as_str()))
            .map(|(i, _)| i)
            .collect();
        self.take_columns(&keep)
    }

    /// Stack the rows of `other` below this table.
    ///
    /// Both tables must be unindexed. Columns are the union of both sides in
    /// first-seen order; cells absent on one side become missing.
    pub fn concat_rows(&self, other: &Table) -> Result<Self> {
        if self.index.is_some() || other.index.is_some() {
            return Err(QcError::InvalidArguments(
                "concat_rows requires unindexed tables; call reset_index first".to_string(),
            ));
        }
        let mut names: Vec<&str> = self.column_names();
        for name in other.column_names() {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        let columns = names
            .into_iter()
            .map(|name| {
                let top = self.column(name);
                let bottom = other.column(name);
                let role = top.or(bottom).map(Column::role).unwrap_or(ColumnRole::Attribute);
                let mut values = Vec::with_capacity(self.n_rows + other.n_rows);
                match top {
                    Some(c) => values.extend(c.values.iter().cloned()),
                    None => values.extend(std::iter::repeat(Cell::Missing).take(self.n_rows)),
                }
                match bottom {
                    Some(c) => values.extend(c.values.iter().cloned()),
                    None => values.extend(std::iter::repeat(Cell::Missing).take(other.n_rows)),
                }
                Column {
                    name: name.to_string(),
                    role,
                    values,
                    source: None,
                }
            })
            .collect();
        Self::with_rows(None, columns, self.n_rows + other.n_rows)
    }

    /// Rename a column, returning a new table.
    pub fn rename_column(&self, from: &str, to: &str) -> Result<Self> {
        let pos = self
            .column_position(from)
            .ok_or_else(|| QcError::MissingColumn(from.to_string()))?;
        let columns = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, c)| if i == pos { c.renamed(to.to_string()) } else { c.clone() })
            .collect();
        Self::with_rows(self.index.clone(), columns, self.n_rows)
    }
}
