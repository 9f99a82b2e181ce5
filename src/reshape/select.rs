//! Row selection with typed comparison predicates.

use crate::data::{Cell, Table};
use crate::error::{QcError, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Comparison operator of a [`Predicate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "==", alias = "=")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    /// Symbol used when displaying the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }

    /// Apply the operator to a cell and a literal.
    ///
    /// Cells of a different kind than the literal, and missing cells, are
    /// never equal and never ordered, so only `!=` holds for them.
    pub fn apply(&self, cell: &Cell, literal: &Cell) -> bool {
        let ord = cell.compare(literal);
        match self {
            CompareOp::Eq => ord == Some(Ordering::Equal),
            CompareOp::Ne => ord != Some(Ordering::Equal),
            CompareOp::Lt => ord == Some(Ordering::Less),
            CompareOp::Le => matches!(ord, Some(Ordering::Less | Ordering::Equal)),
            CompareOp::Gt => ord == Some(Ordering::Greater),
            CompareOp::Ge => matches!(ord, Some(Ordering::Greater | Ordering::Equal)),
        }
    }
}

impl FromStr for CompareOp {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "==" | "=" => Ok(CompareOp::Eq),
            "!=" | "≠" => Ok(CompareOp::Ne),
            "<" => Ok(CompareOp::Lt),
            "<=" | "≤" => Ok(CompareOp::Le),
            ">" => Ok(CompareOp::Gt),
            ">=" | "≥" => Ok(CompareOp::Ge),
            other => Err(QcError::InvalidArguments(format!(
                "Unsupported comparison operator '{}'",
                other
            ))),
        }
    }
}

/// A comparison between a named column (or the row index) and a literal,
/// e.g. `sample_name == 'blc'`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub column: String,
    pub op: CompareOp,
    pub value: Cell,
}

impl Predicate {
    pub fn new(column: &str, op: CompareOp, value: impl Into<Cell>) -> Self {
        Self {
            column: column.to_string(),
            op,
            value: value.into(),
        }
    }

    /// `column == value`
    pub fn equals(column: &str, value: impl Into<Cell>) -> Self {
        Self::new(column, CompareOp::Eq, value)
    }

    /// `column != value`
    pub fn not_equals(column: &str, value: impl Into<Cell>) -> Self {
        Self::new(column, CompareOp::Ne, value)
    }

    /// Evaluate the predicate on every row.
    pub fn mask(&self, table: &Table) -> Result<Vec<bool>> {
        let cells = table.resolve(&self.column)?;
        Ok(cells.iter().map(|c| self.op.apply(c, &self.value)).collect())
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Cell::Text(s) => write!(f, "{} {} '{}'", self.column, self.op.symbol(), s),
            other => write!(f, "{} {} {}", self.column, self.op.symbol(), other),
        }
    }
}

/// Rows where at least one predicate holds (logical OR).
pub fn mask_any(table: &Table, predicates: &[Predicate]) -> Result<Vec<bool>> {
    let mut mask = vec![false; table.n_rows()];
    for p in predicates {
        for (m, hit) in mask.iter_mut().zip(p.mask(table)?) {
            *m |= hit;
        }
    }
    Ok(mask)
}

/// Rows where no predicate holds (logical AND of the negations).
pub fn mask_none(table: &Table, predicates: &[Predicate]) -> Result<Vec<bool>> {
    Ok(mask_any(table, predicates)?.into_iter().map(|hit| !hit).collect())
}

/// Positions of the rows where `mask` is true.
pub fn positions(mask: &[bool]) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter(|(_, &keep)| keep)
        .map(|(i, _)| i)
        .collect()
}

/// Keep rows matching any `include` predicate, then drop rows matching any
/// `exclude` predicate.
///
/// At least one of `include` / `exclude` must be given and non-empty.
pub fn select_rows(
    table: &Table,
    include: Option<&[Predicate]>,
    exclude: Option<&[Predicate]>,
) -> Result<Table> {
    if include.is_none() && exclude.is_none() {
        return Err(QcError::InvalidArguments(
            "Either 'include' or 'exclude' must be provided".to_string(),
        ));
    }
    if include.map_or(false, <[Predicate]>::is_empty)
        || exclude.map_or(false, <[Predicate]>::is_empty)
    {
        return Err(QcError::InvalidArguments(
            "Row predicate lists must not be empty".to_string(),
        ));
    }

    let selected = match include {
        Some(preds) => table.take_rows(&positions(&mask_any(table, preds)?))?,
        None => table.clone(),
    };
    let result = match exclude {
        Some(preds) => selected.take_rows(&positions(&mask_none(&selected, preds)?))?,
        None => selected,
    };

    log::debug!("Row selection kept {} of {} rows", result.n_rows(), table.n_rows());
    Ok(result)
}
