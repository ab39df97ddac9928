//! YAML job file for command-line generation runs.
//!
//! ```yaml
//! database:
//!   name: mms
//!   table: PRODUCT_IMAGES
//! batch:
//!   size: 10000
//! input:
//!   file: data/images.tsv
//!   format: tsv
//!   has_header: true
//! output:
//!   dir: output
//! identifiers:
//!   - name: PRODUCT_ID
//!     column: product_id
//!     data_type: number
//! update_columns:
//!   - name: IMAGE_URL
//!     column: url
//! static_values:
//!   UPDATED_AT: NOW()
//! ```
//!
//! `database`, `input`, `identifiers` and `update_columns` are required.

use std::path::PathBuf;

use serde::Deserialize;

use crate::{
    models::generate::{
        ColumnMapping, GenerateRequest, StaticValues, default_batch_size, default_db_name,
        default_table_name, default_true, loose_bool,
    },
    services::tabular::Format,
};

#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    pub database: DatabaseSection,
    pub input: InputSection,
    pub identifiers: Vec<JobColumn>,
    pub update_columns: Vec<JobColumn>,

    #[serde(default)]
    pub batch: BatchSection,

    #[serde(default)]
    pub output: OutputSection,

    #[serde(default)]
    pub static_values: Option<StaticValues>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    #[serde(default = "default_db_name")]
    pub name: String,

    #[serde(default = "default_table_name")]
    pub table: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputSection {
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Falls back to the input file's extension.
    #[serde(default)]
    pub format: Option<Format>,

    #[serde(default = "default_true")]
    pub has_header: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchSection {
    #[serde(default = "default_batch_size")]
    pub size: u64,
}

impl Default for BatchSection {
    fn default() -> Self {
        Self {
            size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputSection {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

/// One column of the job. `name` is the database column and defaults to the
/// file column.
#[derive(Debug, Clone, Deserialize)]
pub struct JobColumn {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub column: String,

    #[serde(default)]
    pub data_type: String,

    #[serde(default, deserialize_with = "loose_bool")]
    pub is_numeric: bool,
}

impl From<JobColumn> for ColumnMapping {
    fn from(column: JobColumn) -> Self {
        Self {
            db_column: column.name.unwrap_or_else(|| column.column.clone()),
            file_column: column.column,
            data_type: column.data_type,
            is_numeric: column.is_numeric,
        }
    }
}

impl JobConfig {
    /// The equivalent `POST /generate_sql` body, so both entry points share
    /// one validation path.
    pub fn into_request(self, filename: String, batch_size: u64) -> GenerateRequest {
        GenerateRequest {
            filename,
            db_name: self.database.name,
            table_name: self.database.table,
            batch_size,
            file_has_header: self.input.has_header,
            identifiers: self.identifiers.into_iter().map(Into::into).collect(),
            update_columns: self.update_columns.into_iter().map(Into::into).collect(),
            static_values: self.static_values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JOB: &str = r#"
database:
  name: shop
  table: IMAGES
input:
  file: images.tsv
  format: tsv
identifiers:
  - name: PRODUCT_ID
    column: product_id
    is_numeric: "yes"
update_columns:
  - column: url
static_values:
  UPDATED_AT: NOW()
  VERSION: 2
"#;

    #[test]
    fn reads_job_file_with_defaults() {
        let job: JobConfig = serde_yaml::from_str(JOB).unwrap();
        assert_eq!(job.database.name, "shop");
        assert_eq!(job.input.format, Some(Format::Tsv));
        assert!(job.input.has_header);
        assert_eq!(job.batch.size, 10_000);
        assert_eq!(job.output.dir, PathBuf::from("output"));

        let request = job.into_request("images.tsv".into(), 500);
        assert_eq!(request.table_name, "IMAGES");
        assert_eq!(request.batch_size, 500);
        assert_eq!(request.identifiers[0].db_column, "PRODUCT_ID");
        assert!(request.identifiers[0].is_numeric());
        assert_eq!(request.update_columns[0].db_column, "url");

        let pairs = request.static_values.unwrap_or_default().into_pairs();
        assert!(pairs.iter().any(|p| p.field_name == "VERSION" && p.field_value == "2"));
    }

    #[test]
    fn missing_required_section_is_rejected() {
        let err = serde_yaml::from_str::<JobConfig>(
            "database: {name: mms}\ninput: {file: a.csv}\nidentifiers: []\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("update_columns"));
    }
}
