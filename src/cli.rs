//! Command-line interface.
//!
//! - `serve` (the default) runs the HTTP service
//! - `generate` runs one job from a YAML file straight to disk, without the
//!   server

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};

use crate::{
    error::AppError,
    models::job::JobConfig,
    services::{
        batch::{self, GenerationReport},
        plan::UpdatePlan,
        tabular::{ColumnIndex, Format},
    },
};

#[derive(Debug, Parser)]
#[command(name = "sql_batch_web_server", version, about = "CSV/TSV to SQL UPDATE batch generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP service (default)
    Serve,
    /// Generate SQL files from a YAML job file
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Path to the YAML job file
    #[arg(default_value = "config/product_images_update.yaml")]
    pub config_file: PathBuf,

    /// Input CSV/TSV file (overrides `input.file`)
    #[arg(short, long)]
    pub input_file: Option<PathBuf>,

    /// Output directory (overrides `output.dir`)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Statements per output file (overrides `batch.size`)
    #[arg(short, long)]
    pub batch_size: Option<u64>,
}

/// Read and parse a job file.
pub fn load_job(path: &Path) -> anyhow::Result<JobConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Config file '{}' could not be read", path.display()))?;
    serde_yaml::from_str(&text)
        .with_context(|| format!("Config file '{}' is invalid", path.display()))
}

/// Run a generation job described by `args`.
///
/// # Process
///
/// 1. Load the job file
/// 2. Apply command-line overrides (input file, output directory, batch size)
/// 3. Validate the job against the input file's columns
/// 4. Write `{stem}_part_{NNN}.sql` files into the output directory
///
/// Existing files in the output directory are overwritten, not cleared.
pub fn run_generate(args: &GenerateArgs) -> anyhow::Result<GenerationReport> {
    let job = load_job(&args.config_file)?;

    let Some(input) = args.input_file.clone().or_else(|| job.input.file.clone()) else {
        bail!("No input file specified in the config file or on the command line");
    };
    if !input.is_file() {
        bail!("Input file '{}' not found", input.display());
    }
    let filename = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let format = job
        .input
        .format
        .or_else(|| Format::from_filename(&filename))
        .unwrap_or(Format::Csv);

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| job.output.dir.clone());
    let batch_size = args.batch_size.unwrap_or(job.batch.size);
    let has_header = job.input.has_header;

    tracing::info!(
        input = %input.display(),
        output_dir = %output_dir.display(),
        batch_size,
        "generation job loaded"
    );

    let columns = ColumnIndex::from_file(&input, format, has_header)?;
    let plan = UpdatePlan::compile(job.into_request(filename, batch_size), &columns)?;

    std::fs::create_dir_all(&output_dir).with_context(|| {
        format!("Output directory '{}' could not be created", output_dir.display())
    })?;
    let report = batch::generate(&input, format, &plan, &output_dir)?;
    if report.output_files.is_empty() {
        return Err(AppError::NothingGenerated.into());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;

    // =========================================================================
    // ARGUMENTS
    // =========================================================================

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_is_the_default() {
        let cli = Cli::try_parse_from(["sql_batch_web_server"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn generate_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "sql_batch_web_server",
            "generate",
            "job.yaml",
            "-i",
            "in.tsv",
            "--output-dir",
            "out",
            "-b",
            "25",
        ])
        .unwrap();
        let Some(Command::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(args.config_file, PathBuf::from("job.yaml"));
        assert_eq!(args.input_file, Some(PathBuf::from("in.tsv")));
        assert_eq!(args.output_dir, Some(PathBuf::from("out")));
        assert_eq!(args.batch_size, Some(25));
    }

    #[test]
    fn generate_defaults_the_job_path() {
        let cli = Cli::try_parse_from(["sql_batch_web_server", "generate"]).unwrap();
        let Some(Command::Generate(args)) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(
            args.config_file,
            PathBuf::from("config/product_images_update.yaml")
        );
    }

    // =========================================================================
    // JOBS
    // =========================================================================

    fn job_file(dir: &Path, input: &Path) -> PathBuf {
        let path = dir.join("job.yaml");
        let yaml = format!(
            "database:\n  name: mms\n  table: PRODUCT_IMAGES\n\
             batch:\n  size: 100\n\
             input:\n  file: {}\n\
             output:\n  dir: {}\n\
             identifiers:\n  - name: PRODUCT_ID\n    column: product_id\n    data_type: number\n\
             update_columns:\n  - name: IMAGE_URL\n    column: url\n\
             static_values:\n  UPDATED_AT: NOW()\n",
            input.display(),
            dir.join("out").display()
        );
        fs::write(&path, yaml).unwrap();
        path
    }

    fn args(config_file: PathBuf) -> GenerateArgs {
        GenerateArgs {
            config_file,
            input_file: None,
            output_dir: None,
            batch_size: None,
        }
    }

    #[test]
    fn runs_a_job_from_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images.tsv");
        fs::write(&input, "product_id\turl\n7\ta.png\n8\tb.png\n").unwrap();

        let report = run_generate(&args(job_file(dir.path(), &input))).unwrap();

        assert_eq!(report.processed_rows, 2);
        assert_eq!(report.output_files, vec!["images_part_001.sql"]);
        let sql = fs::read_to_string(dir.path().join("out/images_part_001.sql")).unwrap();
        assert!(sql.starts_with("USE mms;\n\n"));
        assert!(sql.contains(
            "UPDATE mms.PRODUCT_IMAGES SET IMAGE_URL = 'a.png', UPDATED_AT = NOW() WHERE PRODUCT_ID = 7;"
        ));
    }

    #[test]
    fn command_line_overrides_the_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let configured = dir.path().join("configured.tsv");
        let input = dir.path().join("override.tsv");
        fs::write(&input, "product_id\turl\n1\ta\n2\tb\n3\tc\n").unwrap();

        let mut args = args(job_file(dir.path(), &configured));
        args.input_file = Some(input);
        args.output_dir = Some(dir.path().join("elsewhere"));
        args.batch_size = Some(2);
        let report = run_generate(&args).unwrap();

        assert_eq!(
            report.output_files,
            vec!["override_part_001.sql", "override_part_002.sql"]
        );
        assert!(dir.path().join("elsewhere/override_part_002.sql").is_file());
    }

    #[test]
    fn missing_input_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");

        let err = run_generate(&args(job_file(dir.path(), &missing))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn invalid_job_is_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("images.tsv");
        fs::write(&input, "sku\turl\n7\ta.png\n").unwrap();

        let err = run_generate(&args(job_file(dir.path(), &input))).unwrap_err();
        assert!(err.to_string().contains("'product_id' does not exist"));
        assert!(!dir.path().join("out").exists());
    }
}
