//! Feature identifiers built from mass and retention time.

use crate::data::{Cell, Column, Table};
use crate::error::{QcError, Result};

/// Prefix of every feature identifier.
pub const FEATURE_ID_PREFIX: &str = "M";
/// Separator between the mass part and the retention-time part.
pub const FEATURE_ID_SEPARATOR: &str = "T";
/// Name of the column holding the feature identifiers.
pub const FEATURE_ID_COLUMN: &str = "metabolite";

/// Accepted header spellings of the mass column.
pub const MZ_ALIASES: &[&str] = &["Mz", "mz", "MZ"];
/// Accepted header spellings of the retention-time column.
pub const RT_ALIASES: &[&str] = &["Rt(min)", "rt(min)", "RT(min)", "Rt", "rt", "RT"];

/// Build a feature identifier: prefix, integer part of the mass, separator,
/// full retention time.
///
/// Values are rendered as text first, so `mz = 482.357, rt = 6.21` gives
/// `M482T6.21`. Non-numeric values are concatenated as they are.
pub fn feature_id(mz: &Cell, rt: &Cell) -> String {
    let mz_text = mz.to_string();
    let mass = mz_text.split('.').next().unwrap_or("");
    format!("{}{}{}{}", FEATURE_ID_PREFIX, mass, FEATURE_ID_SEPARATOR, rt)
}

/// Find the single column matching one of `aliases`.
pub fn find_alias<'a>(table: &'a Table, aliases: &[&str]) -> Result<&'a str> {
    let found: Vec<&str> = table
        .column_names()
        .into_iter()
        .filter(|name| aliases.contains(name))
        .collect();
    match found.as_slice() {
        [one] => Ok(*one),
        [] => Err(QcError::MissingColumn(aliases.join(" | "))),
        many => Err(QcError::AmbiguousKey {
            context: "column aliases".to_string(),
            key: many.join(", "),
        }),
    }
}

/// Return a new table with a [`FEATURE_ID_COLUMN`] appended.
///
/// Row count is unchanged. An existing identifier column is replaced.
pub fn add_feature_ids(table: &Table) -> Result<Table> {
    let mz_name = find_alias(table, MZ_ALIASES)?;
    let rt_name = find_alias(table, RT_ALIASES)?;
    let mz = table.resolve(mz_name)?;
    let rt = table.resolve(rt_name)?;

    let ids: Vec<Cell> = mz
        .iter()
        .zip(rt.iter())
        .map(|(m, r)| Cell::Text(feature_id(m, r)))
        .collect();

    log::debug!(
        "Built {} feature identifiers from '{}' and '{}'",
        ids.len(),
        mz_name,
        rt_name
    );

    let base = table.drop_columns(&[FEATURE_ID_COLUMN])?;
    base.with_column(Column::new(FEATURE_ID_COLUMN, ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_delimited;

    #[test]
    fn test_feature_id_rule() {
        assert_eq!(feature_id(&Cell::Number(482.357), &Cell::Number(6.21)), "M482T6.21");
        assert_eq!(feature_id(&Cell::Number(300.0), &Cell::Number(5.0)), "M300T5.0");
    }

    #[test]
    fn test_non_numeric_propagates() {
        assert_eq!(feature_id(&Cell::from("abc.d"), &Cell::from("x")), "MabcTx");
        assert_eq!(feature_id(&Cell::Missing, &Cell::Number(1.5)), "MnanT1.5");
    }

    #[test]
    fn test_add_feature_ids_title_case() {
        let table = parse_delimited("Mz;Rt(min);S1\n482.357;6.21;10\n301.2;1.05;0\n", ';').unwrap();
        let with_ids = add_feature_ids(&table).unwrap();

        assert_eq!(with_ids.n_rows(), table.n_rows());
        assert_eq!(with_ids.get(0, FEATURE_ID_COLUMN), Some(&Cell::from("M482T6.21")));
        assert_eq!(with_ids.get(1, FEATURE_ID_COLUMN), Some(&Cell::from("M301T1.05")));
    }

    #[test]
    fn test_add_feature_ids_lower_case() {
        let table = parse_delimited("mz;rt;S1\n100.9;2.5;1\n", ';').unwrap();
        let with_ids = add_feature_ids(&table).unwrap();
        assert_eq!(with_ids.get(0, FEATURE_ID_COLUMN), Some(&Cell::from("M100T2.5")));
    }

    #[test]
    fn test_missing_or_ambiguous_alias() {
        let table = parse_delimited("mass;rt\n1;2\n", ';').unwrap();
        assert!(matches!(add_feature_ids(&table), Err(QcError::MissingColumn(_))));

        let table = parse_delimited("Mz;mz;rt\n1;1;2\n", ';').unwrap();
        assert!(matches!(
            add_feature_ids(&table),
            Err(QcError::AmbiguousKey { .. })
        ));
    }
}
