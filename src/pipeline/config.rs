//! Serializable configuration of one dataset run.

use crate::data::{ConflictPolicy, OutputConfig, TableSource, TextEncoding};
use crate::error::{QcError, Result};
use crate::filter::{BlankOperator, CvOperator, QcConfig, QcGroup};
use crate::reshape::{DuplicatePolicy, Predicate, SAMPLE_INDEX_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Instrument ionization mode of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Polarity {
    #[default]
    Pos,
    Neg,
}

impl Polarity {
    /// Upper-case label, `POS` or `NEG`.
    pub fn label(self) -> &'static str {
        match self {
            Polarity::Pos => "POS",
            Polarity::Neg => "NEG",
        }
    }

    /// Default output file stem, e.g. `POS-manipulated`.
    pub fn default_stem(self) -> String {
        format!("{}-manipulated", self.label())
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// When the metadata table is joined to the feature matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeOrder {
    /// Outer-join first; filters see every merged sample.
    #[default]
    BeforeFilters,
    /// Filters see only samples of the feature table (metadata attached for
    /// group lookups); the outer join happens on the filtered matrix.
    AfterFilters,
}

fn default_metadata_key() -> String {
    SAMPLE_INDEX_NAME.to_string()
}

fn default_metadata_exclude() -> Vec<String> {
    ["id natif", "class", "injectionOrder"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Pipeline configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Name of the dataset.
    pub name: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub polarity: Polarity,
    /// Feature table: one row per feature, one column per sample.
    pub features: TableSource,
    /// Extra feature-table columns dropped before transposition, besides
    /// mass and retention time.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub feature_exclude: Vec<String>,
    /// Sample metadata table.
    pub metadata: TableSource,
    /// Column of the metadata table holding sample names.
    #[serde(default = "default_metadata_key")]
    pub metadata_key: String,
    /// Metadata columns dropped before merging.
    #[serde(default = "default_metadata_exclude")]
    pub metadata_exclude: Vec<String>,
    /// Injections removed after transposition (instrument blanks, standards).
    #[serde(default)]
    pub exclude_rows: Vec<Predicate>,
    #[serde(default)]
    pub merge_order: MergeOrder,
    #[serde(default)]
    pub duplicate_ids: DuplicatePolicy,
    pub qc: QcConfig,
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Load from YAML string.
    ///
    /// An unknown blank or CV operator is reported as `InvalidArguments`.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        check_operators(&value)?;
        let config: Self = serde_yaml::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(QcError::FileNotFound(path.to_path_buf()));
        }
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(QcError::from)
    }

    /// Check settings that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.output.file_stem.trim().is_empty() {
            return Err(QcError::Pipeline(format!(
                "dataset '{}': output file_stem must not be empty",
                self.name
            )));
        }
        if self.metadata_exclude.iter().any(|c| c == &self.metadata_key) {
            return Err(QcError::Pipeline(format!(
                "dataset '{}': metadata key '{}' cannot be excluded",
                self.name, self.metadata_key
            )));
        }
        Ok(())
    }

    /// A ready-to-edit template for the given polarity.
    pub fn example(polarity: Polarity) -> Self {
        let tag = polarity.label();
        let features_separator = match polarity {
            Polarity::Pos => '\t',
            Polarity::Neg => ';',
        };
        let exclude_rows = [
            "blc",
            "blc_20240403164953",
            "blc_20240404121923",
            "blc_20240404124839",
            "istd_ode",
        ]
        .iter()
        .map(|s| Predicate::equals(SAMPLE_INDEX_NAME, *s))
        .collect();
        let qc_dilutions = QcGroup::samples([
            "240326NCE_Globale_neg_QC3-DIL8",
            "240326NCE_Globale_neg_QC3",
            "240326NCE_Globale_neg_QC3-DIL2",
        ]);

        let mut qc = QcConfig::new(qc_dilutions);
        qc.cv.threshold = 10.0;

        Self {
            name: format!("{}-thermo", tag),
            description: Some(format!(
                "{} mode feature table curated with blank, zero and CV filters",
                tag
            )),
            polarity,
            features: TableSource::new(format!("data/Align{}Data.csv", tag))
                .separator(features_separator),
            feature_exclude: Vec::new(),
            metadata: TableSource::new(format!("data/thermo{}.csv", tag))
                .encoding(TextEncoding::Latin1),
            metadata_key: default_metadata_key(),
            metadata_exclude: default_metadata_exclude(),
            exclude_rows,
            merge_order: MergeOrder::BeforeFilters,
            duplicate_ids: DuplicatePolicy::Fail,
            qc,
            output: OutputConfig::new("results", &polarity.default_stem())
                .conflict(ConflictPolicy::Replace),
        }
    }
}

/// Parse the filter operators ahead of deserialization so a typo is an
/// argument error rather than a YAML error.
fn check_operators(value: &serde_yaml::Value) -> Result<()> {
    let qc = &value["qc"];
    if let Some(op) = qc["blank"]["operator"].as_str() {
        BlankOperator::from_str(op)?;
    }
    if let Some(op) = qc["cv"]["operator"].as_str() {
        CvOperator::from_str(op)?;
    }
    Ok(())
}
