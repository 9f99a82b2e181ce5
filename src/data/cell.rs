//! Cell values held by a [`Table`](super::Table).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A single table value: numeric, textual, or missing.
///
/// `Missing` is distinct from `Number(0.0)`: zero means "measured as absent",
/// missing means "no measurement" (e.g. introduced by an outer merge).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    /// Numeric value.
    Number(f64),
    /// Free text value.
    Text(String),
    /// Missing value.
    Missing,
}

impl Cell {
    /// Parse a raw field. Empty strings and NA markers become `Missing`.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if is_missing_marker(trimmed) {
            Cell::Missing
        } else if let Ok(v) = trimmed.parse::<f64>() {
            Cell::Number(v)
        } else {
            Cell::Text(raw.to_string())
        }
    }

    /// Check if this is a missing value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// Try to get as a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Try to get as text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check if this cell is a numeric zero.
    pub fn is_zero(&self) -> bool {
        self.as_number() == Some(0.0)
    }

    /// Partial ordering between two cells of the same kind.
    ///
    /// Numbers compare numerically, text lexically. Mixed kinds and missing
    /// values are unordered.
    pub fn compare(&self, other: &Cell) -> Option<Ordering> {
        match (self, other) {
            (Cell::Number(a), Cell::Number(b)) => a.partial_cmp(b),
            (Cell::Text(a), Cell::Text(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Cell {
    /// Renders numbers the way a dataframe string conversion does: integral
    /// floats keep one decimal (`6.0`), missing renders as `nan`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(v) => write!(f, "{}", format_number(*v)),
            Cell::Text(s) => write!(f, "{}", s),
            Cell::Missing => write!(f, "nan"),
        }
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Number(v)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

/// Format a float as its shortest round-trip decimal, keeping `.0` on integers.
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 {
        format!("{:.1}", v)
    } else if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{}", v)
    }
}

fn is_missing_marker(s: &str) -> bool {
    matches!(s, "" | "NA" | "na" | "NaN" | "nan")
}
