//! Pipeline runner: load, reshape, merge, filter and save one dataset.

use crate::data::{read_table, save_table, SaveOutcome, Table};
use crate::error::Result;
use crate::filter::{apply_qc_chain, FilterReport};
use crate::pipeline::config::{MergeOrder, PipelineConfig, Polarity};
use crate::reshape::feature_id::find_alias;
use crate::reshape::{
    add_feature_ids, merge, project, select_rows, transpose_with, FEATURE_ID_COLUMN, MZ_ALIASES,
    RT_ALIASES,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Curated matrix plus the report of every filter.
#[derive(Debug, Clone)]
pub struct QcRun {
    pub matrix: Table,
    pub reports: Vec<FilterReport>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub name: String,
    pub polarity: Polarity,
    /// Rows of the curated matrix.
    pub n_samples: usize,
    /// Feature columns of the curated matrix.
    pub n_features: usize,
    pub reports: Vec<FilterReport>,
    pub outcome: SaveOutcome,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset: {} ({})", self.name, self.polarity)?;
        for report in &self.reports {
            write!(f, "{}", report)?;
        }
        writeln!(
            f,
            "Curated matrix: {} samples x {} features",
            self.n_samples, self.n_features
        )?;
        writeln!(f, "Output: {}", self.outcome)
    }
}

/// Runs the curation stages of one dataset.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create from a config.
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read both input tables, curate them and save the result.
    pub fn run(&self) -> Result<RunSummary> {
        let name = &self.config.name;
        log::info!("Running dataset '{}' ({})", name, self.config.polarity);

        let features = stage("load features", read_table(&self.config.features))?;
        let metadata = stage("load metadata", read_table(&self.config.metadata))?;
        let run = self.curate(&features, &metadata)?;
        let outcome = stage("save", save_table(&run.matrix, &self.config.output))?;

        Ok(RunSummary {
            name: name.clone(),
            polarity: self.config.polarity,
            n_samples: run.matrix.n_rows(),
            n_features: run.matrix.n_features(),
            reports: run.reports,
            outcome,
        })
    }

    /// Curate already loaded tables.
    ///
    /// `features` has one row per feature with mass, retention time and one
    /// abundance column per sample. `metadata` has one row per sample.
    pub fn curate(&self, features: &Table, metadata: &Table) -> Result<QcRun> {
        let config = &self.config;

        let with_ids = stage("feature identifiers", add_feature_ids(features))?;
        let coordinates = stage("coordinate columns", coordinate_columns(&with_ids))?;
        let mut dropped: Vec<&str> = coordinates.to_vec();
        dropped.extend(config.feature_exclude.iter().map(String::as_str));
        let projected = stage(
            "drop coordinates",
            project(&with_ids, None, Some(dropped.as_slice())),
        )?;

        let mut matrix = stage(
            "transpose",
            transpose_with(&projected, FEATURE_ID_COLUMN, config.duplicate_ids),
        )?;
        if !config.exclude_rows.is_empty() {
            matrix = stage(
                "exclude rows",
                select_rows(&matrix, None, Some(config.exclude_rows.as_slice())),
            )?;
        }
        log::info!(
            "Feature matrix: {} samples x {} features",
            matrix.n_rows(),
            matrix.n_features()
        );

        let excluded: Vec<&str> = config.metadata_exclude.iter().map(String::as_str).collect();
        let metadata = stage(
            "prepare metadata",
            project(metadata, None, Some(excluded.as_slice()))
                .and_then(|m| m.set_index(&config.metadata_key)),
        )?;

        let (matrix, reports) = match config.merge_order {
            MergeOrder::BeforeFilters => {
                let merged = stage("merge", merge(&matrix, &metadata))?;
                stage("qc filters", apply_qc_chain(&merged, &config.qc))?
            }
            MergeOrder::AfterFilters => {
                let view = stage("attach metadata", attach_metadata(&matrix, &metadata))?;
                let (_, reports) = stage("qc filters", apply_qc_chain(&view, &config.qc))?;
                let removed: Vec<&str> = reports
                    .iter()
                    .flat_map(|r| r.removed.iter().map(String::as_str))
                    .collect();
                let filtered = matrix.drop_columns(&removed)?;
                (stage("merge", merge(&filtered, &metadata))?, reports)
            }
        };

        log::info!(
            "Curated matrix: {} samples x {} features, {} columns",
            matrix.n_rows(),
            matrix.n_features(),
            matrix.n_columns()
        );
        Ok(QcRun { matrix, reports })
    }
}

/// Names of the mass and retention-time columns.
fn coordinate_columns(table: &Table) -> Result<[&str; 2]> {
    Ok([find_alias(table, MZ_ALIASES)?, find_alias(table, RT_ALIASES)?])
}

/// Left join: metadata attached to the samples of `matrix` only.
fn attach_metadata(matrix: &Table, metadata: &Table) -> Result<Table> {
    let merged = merge(matrix, metadata)?;
    let rows: Vec<usize> = match (matrix.row_keys(), merged.index()) {
        (Some(keys), Some(index)) => keys.iter().filter_map(|k| index.position(k)).collect(),
        _ => Vec::new(),
    };
    merged.take_rows(&rows)
}

/// Log a failing stage and hand the error back unchanged.
fn stage<T>(name: &str, result: Result<T>) -> Result<T> {
    result.map_err(|e| {
        log::error!("Stage '{}' failed: {}", name, e);
        e
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{parse_delimited, Cell, OutputConfig, TableSource};
    use crate::filter::{QcConfig, QcGroup};
    use crate::reshape::{DuplicatePolicy, Predicate};
    use crate::error::QcError;

    const FEATURES: &str = "Mz;Rt(min);blank1;QC1;QC2;S1;istd_ode\n\
                            100.12;1.5;0;10;10;12;3\n\
                            200.5;2.25;0;10;30;0;3\n\
                            300.9;3.0;7;8;9;10;3\n";
    const METADATA: &str = "sample_name;SampleType;class;batch\n\
                            blank1;blank;x;1\n\
                            QC1;qc;x;1\n\
                            QC2;qc;x;1\n\
                            S1;sample;y;1\n\
                            S9;sample;y;2\n";

    fn config(order: MergeOrder) -> PipelineConfig {
        PipelineConfig {
            name: "test".to_string(),
            description: None,
            polarity: Polarity::Pos,
            features: TableSource::new("features.csv"),
            feature_exclude: Vec::new(),
            metadata: TableSource::new("metadata.csv"),
            metadata_key: "sample_name".to_string(),
            metadata_exclude: vec!["class".to_string()],
            exclude_rows: vec![Predicate::equals("sample_name", "istd_ode")],
            merge_order: order,
            duplicate_ids: DuplicatePolicy::Fail,
            qc: QcConfig::new(QcGroup::column_in("SampleType", ["qc"])),
            output: OutputConfig::new("out", "POS-manipulated"),
        }
    }

    fn tables() -> (Table, Table) {
        (
            parse_delimited(FEATURES, ';').unwrap(),
            parse_delimited(METADATA, ';').unwrap(),
        )
    }

    #[test]
    fn test_curate_before_filters() {
        let (features, metadata) = tables();
        let run = Pipeline::new(config(MergeOrder::BeforeFilters))
            .curate(&features, &metadata)
            .unwrap();

        // M300 is seen in the blank, M100 is stable across QC injections.
        assert_eq!(run.matrix.feature_names(), vec!["M200T2.25"]);
        assert_eq!(
            run.matrix.row_keys().unwrap(),
            &["QC1", "QC2", "S1", "S9", "blank1"]
        );
        assert!(run.matrix.has_column("SampleType"));
        assert!(run.matrix.has_column("batch"));
        assert!(!run.matrix.has_column("class"));
        assert!(run.matrix.get_by_key("S9", "M200T2.25").unwrap().is_missing());
        assert_eq!(run.reports.len(), 3);
        assert_eq!(run.reports[0].removed, vec!["M300T3.0"]);
        assert_eq!(run.reports[2].removed, vec!["M100T1.5"]);
    }

    #[test]
    fn test_curate_after_filters() {
        let (features, metadata) = tables();
        let run = Pipeline::new(config(MergeOrder::AfterFilters))
            .curate(&features, &metadata)
            .unwrap();

        assert_eq!(run.matrix.feature_names(), vec!["M200T2.25"]);
        assert_eq!(run.matrix.n_rows(), 5);
        assert_eq!(
            run.matrix.get_by_key("QC2", "M200T2.25"),
            Some(&Cell::Number(30.0))
        );
    }

    #[test]
    fn test_missing_metadata_key() {
        let (features, metadata) = tables();
        let mut config = config(MergeOrder::BeforeFilters);
        config.metadata_key = "sample".to_string();
        let err = Pipeline::new(config).curate(&features, &metadata).unwrap_err();
        assert!(matches!(err, QcError::MissingColumn(c) if c == "sample"));
    }

    #[test]
    fn test_duplicate_ids_surface() {
        let features =
            parse_delimited("mz;rt;S1\n100.1;1.5;1\n100.7;1.5;2\n", ';').unwrap();
        let (_, metadata) = tables();
        let err = Pipeline::new(config(MergeOrder::BeforeFilters))
            .curate(&features, &metadata)
            .unwrap_err();
        assert!(matches!(err, QcError::AmbiguousKey { .. }));
    }

    #[test]
    fn test_numeric_sample_names_merge() {
        let features = parse_delimited("Mz;Rt(min);101;102\n100.1;1.5;4;6\n", ';').unwrap();
        let metadata =
            parse_delimited("sample_name;SampleType\n101;qc\n102;qc\n", ';').unwrap();
        let mut config = config(MergeOrder::BeforeFilters);
        config.exclude_rows.clear();
        config.metadata_exclude.clear();

        let run = Pipeline::new(config).curate(&features, &metadata).unwrap();
        assert_eq!(run.matrix.row_keys().unwrap(), &["101", "102"]);
        assert_eq!(run.matrix.n_rows(), 2);
        assert_eq!(run.matrix.get_by_key("102", "SampleType"), Some(&Cell::from("qc")));
    }

    #[test]
    fn test_run_missing_input() {
        let err = Pipeline::new(config(MergeOrder::BeforeFilters)).run().unwrap_err();
        assert!(matches!(err, QcError::FileNotFound(_)));
    }
}
