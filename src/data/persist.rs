//! Writing the curated matrix to disk under a file-conflict policy.

use crate::data::io::{parse_delimited_text, write_table, TextEncoding};
use crate::data::table::Table;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Leave the existing file untouched and write nothing.
    #[default]
    Skip,
    /// Overwrite the existing file.
    Replace,
    /// Read the existing file, append the new rows and rewrite it.
    Append,
}

/// Outcome of a save request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaveOutcome {
    /// No file existed; a new one was written.
    Created(PathBuf),
    /// An existing file was overwritten.
    Replaced(PathBuf),
    /// Rows were appended to an existing file.
    Appended(PathBuf),
    /// A file existed and the policy was `Skip`: nothing was written.
    Skipped,
}

impl SaveOutcome {
    /// Path of the written file, or `None` when nothing was written.
    pub fn path(&self) -> Option<&Path> {
        match self {
            SaveOutcome::Created(p) | SaveOutcome::Replaced(p) | SaveOutcome::Appended(p) => {
                Some(p)
            }
            SaveOutcome::Skipped => None,
        }
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveOutcome::Created(p) => write!(f, "saved {}", p.display()),
            SaveOutcome::Replaced(p) => write!(f, "replaced existing {}", p.display()),
            SaveOutcome::Appended(p) => write!(f, "appended to {}", p.display()),
            SaveOutcome::Skipped => write!(f, "file exists, saving skipped (no file written)"),
        }
    }
}

/// Destination of the curated matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Output directory (created if missing).
    pub dir: PathBuf,
    /// File name without extension; `.csv` is appended.
    pub file_stem: String,
    /// Field separator.
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Conflict policy when the file already exists.
    #[serde(default)]
    pub conflict: ConflictPolicy,
}

fn default_separator() -> char {
    ';'
}

impl OutputConfig {
    /// Output to `dir/<file_stem>.csv` with `;` separator and `Skip` policy.
    pub fn new(dir: impl Into<PathBuf>, file_stem: &str) -> Self {
        Self {
            dir: dir.into(),
            file_stem: file_stem.to_string(),
            separator: default_separator(),
            conflict: ConflictPolicy::Skip,
        }
    }

    /// Set the conflict policy.
    pub fn conflict(mut self, conflict: ConflictPolicy) -> Self {
        self.conflict = conflict;
        self
    }

    /// Set the field separator.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Full destination path.
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.csv", self.file_stem))
    }
}

/// Save a table according to `output`.
///
/// The row index is written as an explicit first column. Every write goes
/// through a staged temporary file, so a failed save leaves an existing file
/// unchanged. Appending keeps the existing rows as their original text.
pub fn save_table(table: &Table, output: &OutputConfig) -> Result<SaveOutcome> {
    fs::create_dir_all(&output.dir)?;
    let path = output.path();

    if !path.exists() {
        write_table(table, &path, output.separator)?;
        log::info!("CSV file saved: {}", path.display());
        return Ok(SaveOutcome::Created(path));
    }

    match output.conflict {
        ConflictPolicy::Skip => {
            log::warn!("{} already exists, saving skipped", path.display());
            Ok(SaveOutcome::Skipped)
        }
        ConflictPolicy::Replace => {
            write_table(table, &path, output.separator)?;
            log::info!("Existing file replaced: {}", path.display());
            Ok(SaveOutcome::Replaced(path))
        }
        ConflictPolicy::Append => {
            let text = TextEncoding::Utf8.decode(fs::read(&path)?)?;
            let existing = parse_delimited_text(&text, output.separator)?;
            let combined = existing.concat_rows(&table.reset_index())?;
            write_table(&combined, &path, output.separator)?;
            log::info!(
                "Appended {} rows to {} ({} total)",
                table.n_rows(),
                path.display(),
                combined.n_rows()
            );
            Ok(SaveOutcome::Appended(path))
        }
    }
}
