//! Result listing types served by `GET /result`.

use serde::Serialize;

use crate::models::generate::GenerationSummary;

/// One generated SQL file.
///
/// # JSON Example
///
/// ```json
/// {
///   "name": "images_part_001.sql",
///   "size": 10482,
///   "lines": 103,
///   "sha256": "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct OutputFile {
    pub name: String,

    /// File size in bytes
    pub size: u64,

    /// Line count of the file (including `USE` and blank separator lines),
    /// not the number of statements
    pub lines: usize,

    /// Hex-encoded SHA-256 of the file contents
    pub sha256: String,
}

/// Response body for `GET /result`.
#[derive(Debug, Serialize)]
pub struct ResultResponse {
    pub files: Vec<OutputFile>,

    /// Statements written by the last run (0 if no run since startup)
    pub total_rows: u64,

    pub file_count: usize,

    /// Summary of the last run, if one happened since startup
    pub summary: Option<GenerationSummary>,
}
