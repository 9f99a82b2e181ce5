//! Reading and writing feature and metadata tables.

use crate::data::cell::Cell;
use crate::data::table::{Column, Table};
use crate::error::{QcError, Result};
use calamine::{open_workbook_auto, Reader};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Text encoding of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEncoding {
    #[default]
    Utf8,
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    /// Decode raw bytes into a string.
    pub fn decode(self, bytes: Vec<u8>) -> Result<String> {
        match self {
            TextEncoding::Utf8 => String::from_utf8(bytes).map_err(|e| {
                QcError::InvalidArguments(format!(
                    "Input is not valid UTF-8 ({}); try encoding: latin1",
                    e
                ))
            }),
            TextEncoding::Latin1 => Ok(bytes.into_iter().map(char::from).collect()),
        }
    }
}

/// Location and parsing options of a delimited input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSource {
    /// Path to the file.
    pub path: PathBuf,
    /// Field separator (single ASCII character).
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Text encoding.
    #[serde(default)]
    pub encoding: TextEncoding,
}

fn default_separator() -> char {
    ';'
}

impl TableSource {
    /// Source with the default `;` separator and UTF-8 encoding.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            separator: default_separator(),
            encoding: TextEncoding::Utf8,
        }
    }

    /// Set the field separator.
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the text encoding.
    pub fn encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// Convert a separator character to the single byte the CSV codec needs.
pub fn separator_byte(separator: char) -> Result<u8> {
    if separator.is_ascii() {
        Ok(separator as u8)
    } else {
        Err(QcError::InvalidArguments(format!(
            "Separator must be a single ASCII character, got {:?}",
            separator
        )))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Delimited,
    Spreadsheet,
}

fn file_kind(path: &Path) -> Result<FileKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => Ok(FileKind::Delimited),
        "xls" | "xlsx" | "xlsm" | "ods" => Ok(FileKind::Spreadsheet),
        other => Err(QcError::UnsupportedFormat(format!(
            "'.{}' ({}); expected .csv, .tsv, .txt, .xls, .xlsx, .xlsm or .ods",
            other,
            path.display()
        ))),
    }
}

/// Load a table described by `source`.
///
/// Fails with `FileNotFound` before touching the file contents if the path
/// does not exist. Spreadsheets are read from their first worksheet; the
/// separator and encoding only apply to delimited text.
pub fn read_table(source: &TableSource) -> Result<Table> {
    let path = source.path.as_path();
    if !path.exists() {
        return Err(QcError::FileNotFound(path.to_path_buf()));
    }

    let table = match file_kind(path)? {
        FileKind::Delimited => {
            let text = source.encoding.decode(fs::read(path)?)?;
            parse_delimited(&text, source.separator)?
        }
        FileKind::Spreadsheet => read_spreadsheet(path)?,
    };
    log::info!(
        "Loaded {} ({} rows x {} columns)",
        path.display(),
        table.n_rows(),
        table.n_columns()
    );
    Ok(table)
}

/// First worksheet of a workbook; the first row is the header.
fn read_spreadsheet(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| QcError::EmptyData(format!("{} has no worksheet", path.display())))??;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
    let header = rows
        .next()
        .filter(|h| !h.iter().all(|f| f.is_empty()))
        .ok_or_else(|| QcError::EmptyData(format!("{} has no header row", path.display())))?;
    let records = rows
        .filter(|r| !r.iter().all(|f| f.trim().is_empty()))
        .collect();

    Table::from_records(header, records)
}

fn read_records(text: &str, separator: char) -> Result<(Vec<String>, Vec<Vec<String>>)> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(separator_byte(separator)?)
        .flexible(true)
        .from_reader(text.as_bytes());

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();
    if header.iter().all(|h| h.is_empty()) {
        return Err(QcError::EmptyData("Empty table file".to_string()));
    }

    let mut records = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        records.push(record.iter().map(String::from).collect());
    }
    Ok((header, records))
}

/// Parse delimited text with a header row into a table.
pub fn parse_delimited(text: &str, separator: char) -> Result<Table> {
    let (header, records) = read_records(text, separator)?;
    Table::from_records(header, records)
}

/// Parse delimited text keeping every non-empty field verbatim as text.
///
/// Used when rows are carried over unchanged, e.g. appending to an
/// existing output file.
pub fn parse_delimited_text(text: &str, separator: char) -> Result<Table> {
    let (header, records) = read_records(text, separator)?;
    let columns = header
        .into_iter()
        .enumerate()
        .map(|(col_idx, name)| {
            let values = records
                .iter()
                .map(|r| match r.get(col_idx) {
                    Some(v) if !v.is_empty() => Cell::Text(v.clone()),
                    _ => Cell::Missing,
                })
                .collect();
            Column::new(name, values)
        })
        .collect();
    Table::new(columns)
}

/// Write a table as delimited text.
///
/// An index, if present, is written as the leading column. The content is
/// staged in a temporary file next to `path` and moved over it only once
/// complete, so an existing file is either fully replaced or left as is.
pub fn write_table<P: AsRef<Path>>(table: &Table, path: P, separator: char) -> Result<()> {
    let path = path.as_ref();
    let separator = separator_byte(separator)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staged = NamedTempFile::new_in(dir)?;
    write_delimited(table, &mut staged, separator)?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn write_delimited<W: Write>(table: &Table, out: W, separator: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(separator)
        .from_writer(out);

    let flat = table.reset_index();
    writer.write_record(flat.column_names())?;
    for row in 0..flat.n_rows() {
        writer.write_record(flat.columns().iter().map(|c| render(&c.values()[row])))?;
    }
    writer.flush()?;
    Ok(())
}

fn render(cell: &Cell) -> String {
    match cell {
        Cell::Missing => String::new(),
        other => other.to_string(),
    }
}
