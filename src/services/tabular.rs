//! Tabular input handling (CSV and TSV).
//!
//! This module knows how to:
//! - Decide the file format from its extension
//! - Normalize user-supplied filenames into safe workspace names
//! - Read a header + sample preview
//! - Map file column names to record positions

use std::{fs::File, path::Path};

use csv::{Reader, ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[serde(alias = "CSV")]
    Csv,
    #[serde(alias = "TSV")]
    Tsv,
}

impl Format {
    /// Detect the format from a filename's extension (case-insensitive).
    ///
    /// Returns `None` for anything that is not `.csv` or `.tsv`.
    pub fn from_filename(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Format::Csv),
            "tsv" => Some(Format::Tsv),
            _ => None,
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            Format::Csv => b',',
            Format::Tsv => b'\t',
        }
    }
}

/// Reduce a client-supplied filename to a safe single path component.
///
/// # Rules
///
/// - Only the last path component is kept (both `/` and `\` separate)
/// - Whitespace runs become `_`
/// - Characters other than alphanumerics, `.`, `_` and `-` are dropped
/// - Leading and trailing `.` / `_` are stripped
///
/// An empty result means the name is unusable.
pub fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();

    let mut cleaned = String::with_capacity(base.len());
    let mut in_whitespace = false;
    for ch in base.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                cleaned.push('_');
            }
            in_whitespace = true;
            continue;
        }
        in_whitespace = false;
        if ch.is_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            cleaned.push(ch);
        }
    }

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

/// Open a quote-aware, flexible-width reader over `path`.
///
/// Headers are not consumed: callers decide whether the first record is a
/// header or data.
pub fn open_reader(path: &Path, format: Format) -> Result<Reader<File>, csv::Error> {
    ReaderBuilder::new()
        .delimiter(format.delimiter())
        .has_headers(false)
        .flexible(true)
        .from_path(path)
}

/// First line plus a handful of data rows.
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Read the first line as headers and up to `limit` following records.
pub fn read_sample(path: &Path, format: Format, limit: usize) -> Result<Sample, AppError> {
    let mut reader = open_reader(path, format)?;
    let mut records = reader.records();

    let headers = match records.next() {
        Some(first) => record_to_vec(&first?),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records.take(limit) {
        rows.push(record_to_vec(&record?));
    }

    Ok(Sample { headers, rows })
}

fn record_to_vec(record: &StringRecord) -> Vec<String> {
    record.iter().map(str::to_string).collect()
}

/// Resolves file column names to positions within a record.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    names: Vec<String>,
    has_header: bool,
}

impl ColumnIndex {
    /// Build an index from the file's first line.
    ///
    /// With `has_header == false` the first line is still used for names,
    /// since that is what the configure page shows, but it is treated as data.
    pub fn new(first_line: Vec<String>, has_header: bool) -> Self {
        Self {
            names: first_line,
            has_header,
        }
    }

    /// Read the first line of `path` and build an index from it.
    pub fn from_file(path: &Path, format: Format, has_header: bool) -> Result<Self, AppError> {
        let sample = read_sample(path, format, 0)?;
        Ok(Self::new(sample.headers, has_header))
    }

    pub fn has_header(&self) -> bool {
        self.has_header
    }

    /// Position of `column` in each record.
    ///
    /// Header names are matched exactly after trimming. Header-less files also
    /// accept positional names of the form `column_N` (1-based).
    pub fn resolve(&self, column: &str) -> Option<usize> {
        let column = column.trim();
        if let Some(pos) = self.names.iter().position(|name| name.trim() == column) {
            return Some(pos);
        }
        if self.has_header {
            return None;
        }
        column
            .strip_prefix("column_")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map(|n| n - 1)
    }
}
