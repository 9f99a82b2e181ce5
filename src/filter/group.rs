//! QC groups: the rows used as evidence for a filter decision.

use crate::data::{Cell, Table};
use crate::error::{QcError, Result};
use crate::reshape::select::{mask_any, positions, Predicate};
use crate::reshape::SAMPLE_INDEX_NAME;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A transient set of rows selected by predicates combined with OR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QcGroup {
    members: Vec<Predicate>,
}

impl QcGroup {
    /// Group from explicit predicates.
    pub fn new(members: Vec<Predicate>) -> Self {
        Self { members }
    }

    /// Group of the named samples (exact match on the sample index).
    pub fn samples<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::column_in(SAMPLE_INDEX_NAME, names)
    }

    /// Group of rows whose `column` equals one of `values`.
    pub fn column_in<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            members: values
                .into_iter()
                .map(|v| Predicate::equals(column, Cell::from(v.as_ref())))
                .collect(),
        }
    }

    /// Member predicates.
    pub fn members(&self) -> &[Predicate] {
        &self.members
    }

    /// Positions of the rows in this group.
    pub fn rows(&self, table: &Table) -> Result<Vec<usize>> {
        if self.members.is_empty() {
            return Err(QcError::InvalidArguments(
                "QC group must name at least one row predicate".to_string(),
            ));
        }
        let rows = positions(&mask_any(table, &self.members)?);
        if rows.is_empty() {
            log::warn!("QC group [{}] matched no rows", self);
        }
        Ok(rows)
    }
}

impl fmt::Display for QcGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.members.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" or "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_delimited;

    fn matrix() -> Table {
        parse_delimited("sample_name;SampleType\nb1;blank\nS1;sample\nb2;blank\n", ';')
            .unwrap()
            .set_index("sample_name")
            .unwrap()
    }

    #[test]
    fn test_column_in() {
        let group = QcGroup::column_in("SampleType", ["blank"]);
        assert_eq!(group.rows(&matrix()).unwrap(), vec![0, 2]);
    }

    #[test]
    fn test_samples() {
        let group = QcGroup::samples(vec!["S1".to_string(), "b2".to_string()]);
        assert_eq!(group.rows(&matrix()).unwrap(), vec![1, 2]);
        assert_eq!(group.to_string(), "sample_name == 'S1' or sample_name == 'b2'");
    }

    #[test]
    fn test_empty_group_is_invalid() {
        let group = QcGroup::new(Vec::new());
        assert!(matches!(group.rows(&matrix()), Err(QcError::InvalidArguments(_))));
    }

    #[test]
    fn test_yaml_list() {
        let yaml = "- column: SampleType\n  op: '=='\n  value: blank\n";
        let group: QcGroup = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(group, QcGroup::column_in("SampleType", ["blank"]));
    }
}
