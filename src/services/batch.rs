//! Batched SQL script writer.
//!
//! Streams the uploaded file record by record and spreads the resulting
//! statements over `{stem}_part_{NNN}.sql` files of at most `batch_size`
//! statements each. This is blocking I/O; async callers run it on
//! `tokio::task::spawn_blocking`.

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{
    error::AppError,
    services::{
        plan::UpdatePlan,
        sql::{SkipReason, build_update},
        tabular::{Format, open_reader},
    },
};

/// Statements between blank separator lines inside one file.
const STATEMENTS_PER_BLOCK: u64 = 100;

/// Outcome of one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Statements written.
    pub processed_rows: u64,
    /// Non-blank records that produced no statement.
    pub skipped_rows: u64,
    /// Output file names, in write order.
    pub output_files: Vec<String>,
}

/// The file currently receiving statements.
struct OpenBatch {
    writer: BufWriter<File>,
    statements: u64,
}

/// Rotating set of output files for one run.
struct BatchSink<'a> {
    dir: &'a Path,
    stem: String,
    database: &'a str,
    batch_size: u64,
    current: Option<OpenBatch>,
    files: Vec<String>,
}

impl<'a> BatchSink<'a> {
    fn new(dir: &'a Path, stem: String, plan: &'a UpdatePlan) -> Self {
        Self {
            dir,
            stem,
            database: &plan.database,
            batch_size: plan.batch_size,
            current: None,
            files: Vec::new(),
        }
    }

    /// Close the current file (if any) and start the next part.
    fn rotate(&mut self) -> io::Result<()> {
        if let Some(mut full) = self.current.take() {
            full.writer.flush()?;
        }
        let name = format!("{}_part_{:03}.sql", self.stem, self.files.len() + 1);
        let mut writer = BufWriter::new(File::create(self.dir.join(&name))?);
        writeln!(writer, "USE {};", self.database)?;
        writeln!(writer)?;
        tracing::debug!(file = %name, "opened batch file");
        self.files.push(name);
        self.current = Some(OpenBatch {
            writer,
            statements: 0,
        });
        Ok(())
    }

    fn write(&mut self, statement: &str) -> io::Result<()> {
        let full = self
            .current
            .as_ref()
            .is_none_or(|batch| batch.statements >= self.batch_size);
        if full {
            self.rotate()?;
        }
        if let Some(batch) = self.current.as_mut() {
            writeln!(batch.writer, "{statement}")?;
            batch.statements += 1;
            if batch.statements % STATEMENTS_PER_BLOCK == 0 {
                writeln!(batch.writer)?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> io::Result<Vec<String>> {
        if let Some(mut last) = self.current.take() {
            last.writer.flush()?;
        }
        Ok(self.files)
    }
}

/// Generate SQL scripts for every record of `input` into `output_dir`.
///
/// Output files are opened lazily, so a run that produces no statements
/// leaves no files behind.
pub fn generate(
    input: &Path,
    format: Format,
    plan: &UpdatePlan,
    output_dir: &Path,
) -> Result<GenerationReport, AppError> {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());

    let mut reader = open_reader(input, format)?;
    let mut sink = BatchSink::new(output_dir, stem, plan);
    let mut report = GenerationReport::default();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        if line == 0 && plan.has_header {
            continue;
        }
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        match build_update(&record, plan) {
            Ok(statement) => {
                sink.write(&statement)?;
                report.processed_rows += 1;
            }
            Err(SkipReason::MissingIdentifier(column)) => {
                tracing::warn!(line = line + 1, column = %column, "identifier value missing, row skipped");
                report.skipped_rows += 1;
            }
            Err(SkipReason::NothingToUpdate) => {
                tracing::warn!(line = line + 1, "no columns to update, row skipped");
                report.skipped_rows += 1;
            }
        }
    }

    report.output_files = sink.finish()?;

    tracing::info!(
        processed = report.processed_rows,
        skipped = report.skipped_rows,
        files = report.output_files.len(),
        "generation finished"
    );

    Ok(report)
}
