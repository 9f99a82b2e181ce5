//! Column projection: keep or drop named columns.

use crate::data::Table;
use crate::error::{QcError, Result};
use crate::reshape::feature_id::FEATURE_ID_PREFIX;

/// Keep only the `include` columns (in the given order), or drop the
/// `exclude` columns (preserving the original order).
///
/// Exactly one of `include` / `exclude` must be given. Unknown names in
/// `include` are an error; unknown names in `exclude` are ignored.
pub fn project(table: &Table, include: Option<&[&str]>, exclude: Option<&[&str]>) -> Result<Table> {
    match (include, exclude) {
        (Some(_), Some(_)) => Err(QcError::InvalidArguments(
            "Only one of 'include' or 'exclude' should be provided".to_string(),
        )),
        (None, None) => Err(QcError::InvalidArguments(
            "Either 'include' or 'exclude' must be provided".to_string(),
        )),
        (Some(names), None) => {
            let positions = names
                .iter()
                .map(|name| {
                    table
                        .column_position(name)
                        .ok_or_else(|| QcError::MissingColumn(name.to_string()))
                })
                .collect::<Result<Vec<_>>>()?;
            table.take_columns(&positions)
        }
        (None, Some(names)) => table.drop_columns(names),
    }
}

/// Keep columns whose name starts with the feature-ID prefix, followed by
/// any `extra` columns.
pub fn select_feature_columns(table: &Table, extra: Option<&[&str]>) -> Result<Table> {
    let mut positions: Vec<usize> = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(_, c)| c.name().starts_with(FEATURE_ID_PREFIX))
        .map(|(i, _)| i)
        .collect();

    for name in extra.unwrap_or_default() {
        let pos = table
            .column_position(name)
            .ok_or_else(|| QcError::MissingColumn(name.to_string()))?;
        if !positions.contains(&pos) {
            positions.push(pos);
        }
    }
    table.take_columns(&positions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::parse_delimited;

    fn table() -> Table {
        parse_delimited(
            "id natif;M100T1.0;class;M200T2.0;injectionOrder\na;1;x;2;3\n",
            ';',
        )
        .unwrap()
    }

    #[test]
    fn test_include_keeps_given_order() {
        let out = project(&table(), Some(&["M200T2.0", "class"]), None).unwrap();
        assert_eq!(out.column_names(), vec!["M200T2.0", "class"]);
    }

    #[test]
    fn test_exclude_preserves_order() {
        let out = project(&table(), None, Some(&["id natif", "class", "injectionOrder"])).unwrap();
        assert_eq!(out.column_names(), vec!["M100T1.0", "M200T2.0"]);
    }

    #[test]
    fn test_include_and_complement_exclude_agree() {
        let t = table();
        let keep = ["M100T1.0", "class"];
        let complement: Vec<&str> = t
            .column_names()
            .into_iter()
            .filter(|n| !keep.contains(n))
            .collect();

        let a = project(&t, Some(&keep), None).unwrap();
        let b = project(&t, None, Some(&complement)).unwrap();
        let mut a_names = a.column_names();
        let mut b_names = b.column_names();
        a_names.sort();
        b_names.sort();
        assert_eq!(a_names, b_names);
    }

    #[test]
    fn test_both_or_neither_is_invalid() {
        let t = table();
        assert!(matches!(
            project(&t, Some(&["class"]), Some(&["class"])),
            Err(QcError::InvalidArguments(_))
        ));
        assert!(matches!(project(&t, None, None), Err(QcError::InvalidArguments(_))));
    }

    #[test]
    fn test_unknown_include_column() {
        assert!(matches!(
            project(&table(), Some(&["nope"]), None),
            Err(QcError::MissingColumn(_))
        ));
    }

    #[test]
    fn test_select_feature_columns() {
        let t = table();
        let only = select_feature_columns(&t, None).unwrap();
        assert_eq!(only.column_names(), vec!["M100T1.0", "M200T2.0"]);

        let with_extra = select_feature_columns(&t, Some(&["class"])).unwrap();
        assert_eq!(with_extra.column_names(), vec!["M100T1.0", "M200T2.0", "class"]);
    }
}
