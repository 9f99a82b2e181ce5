//! Integration tests for the feature-table curation pipeline.

use metabo_qc::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const FEATURES: &str = "Mz;Rt(min);blank1;S1;S2\n\
                        120.45;1.5;4;10;12\n\
                        200.91;2.5;0;5;7\n";

const METADATA: &str = "sample_name;SampleType;class;injectionOrder\n\
                        blank1;blank;none;1\n\
                        S1;sample;A;2\n\
                        S2;sample;B;3\n";

fn write_inputs(dir: &Path) {
    fs::write(dir.join("features.csv"), FEATURES).unwrap();
    fs::write(dir.join("metadata.csv"), METADATA).unwrap();
}

fn config_yaml(dir: &Path, conflict: &str) -> String {
    format!(
        r#"
name: e2e
polarity: pos
features:
  path: '{dir}/features.csv'
metadata:
  path: '{dir}/metadata.csv'
qc:
  cv:
    group:
      - {{ column: SampleType, op: "==", value: sample }}
output:
  dir: '{dir}/out'
  file_stem: POS-manipulated
  conflict: {conflict}
"#,
        dir = dir.display(),
        conflict = conflict
    )
}

fn single_feature(values: &[f64]) -> Table {
    let keys = (0..values.len()).map(|i| format!("S{}", i)).collect();
    Table::with_index(
        RowIndex::new("sample_name", keys).unwrap(),
        vec![Column::feature(
            "F1",
            values.iter().map(|&v| Cell::Number(v)).collect(),
        )],
    )
    .unwrap()
}

#[test]
fn test_end_to_end_replace() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());

    let yaml_path = dir.path().join("pos.yaml");
    fs::write(&yaml_path, config_yaml(dir.path(), "replace")).unwrap();
    let config = PipelineConfig::from_yaml_file(&yaml_path).unwrap();
    let output_path = config.output.path();

    fs::create_dir_all(output_path.parent().unwrap()).unwrap();
    fs::write(&output_path, "stale;content\n1;2\n").unwrap();

    let summary = Pipeline::new(config).run().unwrap();

    assert_eq!(summary.outcome, SaveOutcome::Replaced(output_path.clone()));
    assert_eq!(summary.n_features, 1);
    assert_eq!(summary.n_samples, 3);
    assert_eq!(summary.reports[0].removed, vec!["M120T1.5"]);

    let saved = read_table(&TableSource::new(&output_path)).unwrap();
    assert_eq!(
        saved.column_names(),
        vec!["sample_name", "M200T2.5", "SampleType"]
    );
    assert_eq!(saved.n_rows(), 3);

    let saved = saved.set_index("sample_name").unwrap();
    assert_eq!(saved.get_by_key("S2", "M200T2.5"), Some(&Cell::Number(7.0)));
    assert_eq!(saved.get_by_key("blank1", "SampleType"), Some(&Cell::from("blank")));
    assert!(!saved.has_column("stale"));
}

#[test]
fn test_skip_then_append() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());

    let first = PipelineConfig::from_yaml(&config_yaml(dir.path(), "skip")).unwrap();
    let output_path = first.output.path();
    let created = Pipeline::new(first.clone()).run().unwrap();
    assert_eq!(created.outcome, SaveOutcome::Created(output_path.clone()));

    let before = fs::read_to_string(&output_path).unwrap();
    let skipped = Pipeline::new(first).run().unwrap();
    assert_eq!(skipped.outcome, SaveOutcome::Skipped);
    assert!(skipped.outcome.path().is_none());
    assert_eq!(fs::read_to_string(&output_path).unwrap(), before);

    let append = PipelineConfig::from_yaml(&config_yaml(dir.path(), "append")).unwrap();
    let appended = Pipeline::new(append).run().unwrap();
    assert_eq!(appended.outcome, SaveOutcome::Appended(output_path.clone()));
    let saved = read_table(&TableSource::new(&output_path)).unwrap();
    assert_eq!(saved.n_rows(), 6);
}

#[test]
fn test_missing_input_fails_before_writing() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::from_yaml(&config_yaml(dir.path(), "replace")).unwrap();
    let output_path = config.output.path();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, QcError::FileNotFound(_)));
    assert!(!output_path.exists());
}

#[test]
fn test_unsupported_format() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("features.parquet");
    fs::write(&path, "x").unwrap();
    assert!(matches!(
        read_table(&TableSource::new(&path)),
        Err(QcError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_blank_filter_property() {
    let table = Table::with_index(
        RowIndex::new("sample_name", vec!["blank".into(), "S1".into()]).unwrap(),
        vec![
            Column::feature("F1", vec![5.0.into(), 3.0.into()]),
            Column::feature("F2", vec![0.0.into(), 3.0.into()]),
        ],
    )
    .unwrap();
    let out = filter_blank(&table, &QcGroup::samples(["blank"]), BlankOperator::NotEqual, 0.0)
        .unwrap();
    assert_eq!(out.feature_names(), vec!["F2"]);
}

#[test]
fn test_zero_proportion_property() {
    let dropped = filter_zero_proportion(&single_feature(&[0.0, 0.0, 0.0, 1.0]), 0.75).unwrap();
    assert_eq!(dropped.n_features(), 0);

    let kept = filter_zero_proportion(&single_feature(&[0.0, 0.0, 1.0, 1.0]), 0.75).unwrap();
    assert_eq!(kept.n_features(), 1);
}

#[test]
fn test_cv_property() {
    let group = QcGroup::samples(["S0", "S1", "S2"]);

    let stable = single_feature(&[100.0, 101.0, 99.0]);
    let out = filter_cv(&stable, &group, 10.0, CvOperator::LessEqual).unwrap();
    assert_eq!(out.n_features(), 0);

    let noisy = single_feature(&[50.0, 100.0, 150.0]);
    let out = filter_cv(&noisy, &group, 10.0, CvOperator::LessEqual).unwrap();
    assert_eq!(out.n_features(), 1);
}

#[test]
fn test_project_include_matches_complement_exclude() {
    let table = metabo_qc::data::parse_delimited("a;b;c;d\n1;2;3;4\n", ';').unwrap();
    let included = project(&table, Some(&["b", "d"]), None).unwrap();
    let excluded = project(&table, None, Some(&["a", "c"])).unwrap();
    assert_eq!(included.column_names(), excluded.column_names());
}
