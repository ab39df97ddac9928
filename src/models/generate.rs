//! SQL generation request/response types.
//!
//! This module defines:
//! - `GenerateRequest`: Body of `POST /generate_sql`
//! - `GenerateResponse`: Successful generation reply
//! - `GenerationSummary`: Run statistics, also served by `GET /result`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Request body for generating SQL from the uploaded file.
///
/// # JSON Example
///
/// ```json
/// {
///   "filename": "images.tsv",
///   "db_name": "mms",
///   "table_name": "PRODUCT_IMAGES",
///   "batch_size": 10000,
///   "file_has_header": true,
///   "identifiers": [
///     { "db_column": "PRODUCT_ID", "file_column": "product_id", "data_type": "number" }
///   ],
///   "update_columns": [
///     { "db_column": "IMAGE_URL", "file_column": "url", "data_type": "string" }
///   ],
///   "static_values": [
///     { "field_name": "UPDATED_AT", "field_value": "NOW()" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub filename: String,

    #[serde(default = "default_db_name")]
    pub db_name: String,

    #[serde(default = "default_table_name")]
    pub table_name: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Whether the first line is a header. Older clients send `has_header`.
    #[serde(default = "default_true", alias = "has_header")]
    pub file_has_header: bool,

    #[serde(default)]
    pub identifiers: Vec<ColumnMapping>,

    #[serde(default)]
    pub update_columns: Vec<ColumnMapping>,

    #[serde(default)]
    pub static_values: Option<StaticValues>,
}

pub(crate) fn default_db_name() -> String {
    "mms".to_string()
}

pub(crate) fn default_table_name() -> String {
    "PRODUCT_IMAGES".to_string()
}

pub(crate) fn default_batch_size() -> u64 {
    10_000
}

pub(crate) fn default_true() -> bool {
    true
}

/// Maps a database column to a column of the uploaded file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub db_column: String,

    #[serde(default)]
    pub file_column: String,

    /// Free-form type hint from the form, `number` makes the value numeric.
    #[serde(default)]
    pub data_type: String,

    /// Accepts `true`/`false` as well as the form-style strings `"true"`,
    /// `"1"` and `"yes"`.
    #[serde(default, deserialize_with = "loose_bool")]
    pub is_numeric: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseBool {
    Bool(bool),
    Number(i64),
    Text(String),
}

/// Truthiness the way HTML forms and hand-written YAML spell it.
pub(crate) fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<LooseBool>::deserialize(deserializer)? {
        None => false,
        Some(LooseBool::Bool(flag)) => flag,
        Some(LooseBool::Number(n)) => n != 0,
        Some(LooseBool::Text(text)) => {
            matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
        }
    })
}

impl ColumnMapping {
    pub fn is_blank(&self) -> bool {
        self.db_column.trim().is_empty() && self.file_column.trim().is_empty()
    }

    pub fn is_numeric(&self) -> bool {
        self.is_numeric || self.data_type.trim().eq_ignore_ascii_case("number")
    }
}

/// Constant assignments added to every statement.
///
/// The browser form sends a list of `{field_name, field_value}` rows; scripted
/// callers may send a plain `{"COLUMN": "value"}` object instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StaticValues {
    List(Vec<StaticValue>),
    Map(BTreeMap<String, serde_json::Value>),
}

impl Default for StaticValues {
    fn default() -> Self {
        StaticValues::List(Vec::new())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StaticValue {
    #[serde(default)]
    pub field_name: String,

    #[serde(default)]
    pub field_value: String,
}

impl StaticValues {
    /// Flatten into `(name, value)` pairs, preserving list order.
    ///
    /// JSON scalars in the map form are stringified; `null` becomes blank.
    pub fn into_pairs(self) -> Vec<StaticValue> {
        match self {
            StaticValues::List(list) => list,
            StaticValues::Map(map) => map
                .into_iter()
                .map(|(field_name, value)| StaticValue {
                    field_name,
                    field_value: match value {
                        serde_json::Value::Null => String::new(),
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    },
                })
                .collect(),
        }
    }
}

/// Statistics for one generation run.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationSummary {
    pub run_id: Uuid,
    pub source_file: String,
    pub processed_rows: u64,
    pub skipped_rows: u64,
    pub file_count: usize,
    pub output_files: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub rows_per_second: u64,
}

/// Successful reply to `POST /generate_sql`.
///
/// The client navigates to `redirect_url` and keeps `summary` for display.
#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub redirect_url: String,
    pub output_files: Vec<String>,
    pub processed_rows: u64,
    pub summary: GenerationSummary,
}

impl From<GenerationSummary> for GenerateResponse {
    fn from(summary: GenerationSummary) -> Self {
        Self {
            success: true,
            redirect_url: "/result".to_string(),
            output_files: summary.output_files.clone(),
            processed_rows: summary.processed_rows,
            summary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_fields() {
        let request: GenerateRequest = serde_json::from_str(r#"{"filename":"a.csv"}"#).unwrap();
        assert_eq!(request.db_name, "mms");
        assert_eq!(request.table_name, "PRODUCT_IMAGES");
        assert_eq!(request.batch_size, 10_000);
        assert!(request.file_has_header);
        assert!(request.identifiers.is_empty());
    }

    #[test]
    fn legacy_has_header_alias_is_accepted() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"filename":"a.csv","has_header":false}"#).unwrap();
        assert!(!request.file_has_header);
    }

    #[test]
    fn static_values_accept_list_form() {
        let request: GenerateRequest = serde_json::from_str(
            r#"{"static_values":[{"field_name":"A","field_value":"1"},{"field_name":"B","field_value":"x"}]}"#,
        )
        .unwrap();
        let pairs = request.static_values.unwrap_or_default().into_pairs();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].field_name, "A");
        assert_eq!(pairs[1].field_value, "x");
    }

    #[test]
    fn static_values_accept_map_form() {
        let request: GenerateRequest =
            serde_json::from_str(r#"{"static_values":{"STATUS":1,"NOTE":"ok","GONE":null}}"#)
                .unwrap();
        let pairs = request.static_values.unwrap_or_default().into_pairs();
        let find = |name: &str| {
            pairs
                .iter()
                .find(|p| p.field_name == name)
                .map(|p| p.field_value.clone())
        };
        assert_eq!(find("STATUS").as_deref(), Some("1"));
        assert_eq!(find("NOTE").as_deref(), Some("ok"));
        assert_eq!(find("GONE").as_deref(), Some(""));
    }

    #[test]
    fn numeric_flag_comes_from_type_or_explicit_flag() {
        let by_type = ColumnMapping {
            data_type: "Number".into(),
            ..Default::default()
        };
        let by_flag = ColumnMapping {
            is_numeric: true,
            ..Default::default()
        };
        let text = ColumnMapping {
            data_type: "string".into(),
            ..Default::default()
        };
        assert!(by_type.is_numeric());
        assert!(by_flag.is_numeric());
        assert!(!text.is_numeric());
    }

    #[test]
    fn numeric_flag_accepts_form_strings() {
        let flag = |value: serde_json::Value| {
            let mapping: ColumnMapping =
                serde_json::from_value(serde_json::json!({ "is_numeric": value })).unwrap();
            mapping.is_numeric
        };
        assert!(flag(serde_json::json!(true)));
        assert!(flag(serde_json::json!("true")));
        assert!(flag(serde_json::json!("YES")));
        assert!(flag(serde_json::json!("1")));
        assert!(flag(serde_json::json!(1)));
        assert!(!flag(serde_json::json!("no")));
        assert!(!flag(serde_json::json!("false")));
        assert!(!flag(serde_json::json!(0)));
        assert!(!flag(serde_json::json!(null)));
    }
}
