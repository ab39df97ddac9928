//! Generation request validation.
//!
//! Turns a [`GenerateRequest`] into an [`UpdatePlan`]: every column is checked,
//! every file column resolved to a record position, and every static value
//! pre-rendered. Nothing after this point can fail on bad user input.

use crate::{
    error::AppError,
    models::generate::{ColumnMapping, GenerateRequest},
    services::{sql::render_static_value, tabular::ColumnIndex},
};

/// A database column bound to a position in each input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnBinding {
    pub db_column: String,
    pub file_column: String,
    pub position: usize,
    pub numeric: bool,
}

/// Validated, ready-to-run generation job.
#[derive(Debug, Clone)]
pub struct UpdatePlan {
    pub database: String,
    pub table: String,
    pub batch_size: u64,
    pub has_header: bool,
    pub identifiers: Vec<ColumnBinding>,
    pub update_columns: Vec<ColumnBinding>,
    /// `(column, rendered SQL literal)` pairs appended to every SET clause.
    pub static_values: Vec<(String, String)>,
}

/// Whether `name` can be spliced into a statement as a bare identifier.
///
/// Letters, digits, `_` and `$` only. This keeps user-typed table and column
/// names from carrying SQL of their own.
pub fn is_plain_identifier(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

fn require_identifier(name: &str, what: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidRequest(format!("{what} must not be empty")));
    }
    if !is_plain_identifier(name) {
        return Err(AppError::InvalidRequest(format!(
            "{what} '{name}' may only contain letters, digits, '_' and '$'"
        )));
    }
    Ok(name.to_string())
}

/// Validate and bind one group of column mappings.
///
/// Fully blank rows are ignored, partially filled rows are rejected with the
/// 1-based row number so the form can point at it.
fn bind_columns(
    mappings: &[ColumnMapping],
    columns: &ColumnIndex,
    label: &str,
) -> Result<Vec<ColumnBinding>, AppError> {
    let mut bindings = Vec::with_capacity(mappings.len());
    for (i, mapping) in mappings.iter().enumerate() {
        if mapping.is_blank() {
            continue;
        }
        let row = i + 1;
        let db_column = require_identifier(
            &mapping.db_column,
            &format!("{label} #{row} database column"),
        )?;
        let file_column = mapping.file_column.trim();
        if file_column.is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "{label} #{row} file column must be selected"
            )));
        }
        let position = columns.resolve(file_column).ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "{label} #{row} file column '{file_column}' does not exist in the uploaded file"
            ))
        })?;
        bindings.push(ColumnBinding {
            db_column,
            file_column: file_column.to_string(),
            position,
            numeric: mapping.is_numeric(),
        });
    }
    Ok(bindings)
}

impl UpdatePlan {
    /// Validate `request` against the uploaded file's columns.
    ///
    /// # Errors
    ///
    /// `InvalidRequest` with a message naming the first offending field.
    pub fn compile(request: GenerateRequest, columns: &ColumnIndex) -> Result<Self, AppError> {
        let database = require_identifier(&request.db_name, "Database name")?;
        let table = require_identifier(&request.table_name, "Table name")?;

        if request.batch_size == 0 {
            return Err(AppError::InvalidRequest(
                "Batch size must be a positive integer".to_string(),
            ));
        }

        let identifiers = bind_columns(&request.identifiers, columns, "Identifier")?;
        if identifiers.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one identifier is required".to_string(),
            ));
        }

        let update_columns = bind_columns(&request.update_columns, columns, "Update column")?;

        let mut static_values = Vec::new();
        let pairs = request.static_values.unwrap_or_default().into_pairs();
        for (i, pair) in pairs.into_iter().enumerate() {
            let name = pair.field_name.trim();
            let value = pair.field_value.trim();
            if name.is_empty() {
                if value.is_empty() {
                    continue;
                }
                return Err(AppError::InvalidRequest(format!(
                    "Static value #{} field name must not be empty",
                    i + 1
                )));
            }
            let column = require_identifier(name, &format!("Static value #{} field name", i + 1))?;
            let rendered = render_static_value(value).ok_or_else(|| {
                AppError::InvalidRequest(format!(
                    "Static value #{} value must not be empty when a field name is given",
                    i + 1
                ))
            })?;
            static_values.push((column, rendered));
        }

        if update_columns.is_empty() && static_values.is_empty() {
            return Err(AppError::InvalidRequest(
                "At least one update column or static value is required".to_string(),
            ));
        }

        Ok(Self {
            database,
            table,
            batch_size: request.batch_size,
            has_header: columns.has_header(),
            identifiers,
            update_columns,
            static_values,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn columns() -> ColumnIndex {
        ColumnIndex::new(vec!["sku".into(), "url".into(), "alt".into()], true)
    }

    fn request(body: serde_json::Value) -> GenerateRequest {
        serde_json::from_value(body).unwrap()
    }

    fn message(err: AppError) -> String {
        match err {
            AppError::InvalidRequest(msg) => msg,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn compiles_a_complete_request() {
        let plan = UpdatePlan::compile(
            request(json!({
                "filename": "a.csv",
                "batch_size": 50,
                "identifiers": [{"db_column": "SKU", "file_column": "sku", "data_type": "number"}],
                "update_columns": [
                    {"db_column": "URL", "file_column": "url", "data_type": "string"},
                    {"db_column": "", "file_column": ""}
                ],
                "static_values": [{"field_name": "UPDATED_AT", "field_value": "now()"}]
            })),
            &columns(),
        )
        .unwrap();

        assert_eq!(plan.database, "mms");
        assert_eq!(plan.batch_size, 50);
        assert_eq!(plan.identifiers[0].position, 0);
        assert!(plan.identifiers[0].numeric);
        assert_eq!(plan.update_columns.len(), 1);
        assert_eq!(plan.update_columns[0].position, 1);
        assert_eq!(plan.static_values, vec![("UPDATED_AT".into(), "now()".into())]);
    }

    #[test]
    fn requires_an_identifier() {
        let err = UpdatePlan::compile(
            request(json!({
                "identifiers": [{"db_column": "", "file_column": ""}],
                "update_columns": [{"db_column": "URL", "file_column": "url"}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert_eq!(message(err), "At least one identifier is required");
    }

    #[test]
    fn requires_something_to_update() {
        let err = UpdatePlan::compile(
            request(json!({
                "identifiers": [{"db_column": "SKU", "file_column": "sku"}],
                "static_values": [{"field_name": "", "field_value": ""}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert_eq!(
            message(err),
            "At least one update column or static value is required"
        );
    }

    #[test]
    fn partially_filled_rows_are_rejected() {
        let err = UpdatePlan::compile(
            request(json!({
                "identifiers": [{"db_column": "SKU", "file_column": "sku"}],
                "update_columns": [{"db_column": "URL", "file_column": ""}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert_eq!(message(err), "Update column #1 file column must be selected");
    }

    #[test]
    fn unknown_file_columns_are_rejected() {
        let err = UpdatePlan::compile(
            request(json!({
                "identifiers": [{"db_column": "SKU", "file_column": "product"}],
                "update_columns": [{"db_column": "URL", "file_column": "url"}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert!(message(err).contains("'product' does not exist"));
    }

    #[test]
    fn unsafe_names_are_rejected() {
        let err = UpdatePlan::compile(
            request(json!({
                "table_name": "IMAGES; DROP TABLE USERS",
                "identifiers": [{"db_column": "SKU", "file_column": "sku"}],
                "update_columns": [{"db_column": "URL", "file_column": "url"}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert!(message(err).starts_with("Table name"));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let err = UpdatePlan::compile(
            request(json!({
                "batch_size": 0,
                "identifiers": [{"db_column": "SKU", "file_column": "sku"}],
                "update_columns": [{"db_column": "URL", "file_column": "url"}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert_eq!(message(err), "Batch size must be a positive integer");
    }

    #[test]
    fn static_value_needs_a_value() {
        let err = UpdatePlan::compile(
            request(json!({
                "identifiers": [{"db_column": "SKU", "file_column": "sku"}],
                "static_values": [{"field_name": "STATUS", "field_value": "  "}]
            })),
            &columns(),
        )
        .unwrap_err();
        assert!(message(err).starts_with("Static value #1 value must not be empty"));
    }
}
