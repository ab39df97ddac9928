//! SQL literal escaping and `UPDATE` statement rendering.
//!
//! Every value that comes from the uploaded file or from a static value goes
//! through [`escape_value`] before it reaches the generated script.

use csv::StringRecord;

use crate::services::plan::UpdatePlan;

/// Keywords passed through (upper-cased) instead of being quoted.
const SQL_TIME_FUNCTIONS: [&str; 4] = ["CURRENT_TIMESTAMP", "NOW()", "GETDATE()", "SYSDATE"];

/// Render a raw cell value as a SQL literal.
///
/// # Rules (applied to the trimmed value, in order)
///
/// 1. Empty → `NULL`
/// 2. `numeric` and a finite number → emitted verbatim
/// 3. `true` / `false` → `TRUE` / `FALSE`
/// 4. `null` → `NULL`
/// 5. `CURRENT_TIMESTAMP`, `NOW()`, `GETDATE()`, `SYSDATE` → upper-cased keyword
/// 6. Anything else → single-quoted string with `'` doubled
pub fn escape_value(raw: &str, numeric: bool) -> String {
    let value = raw.trim();
    if value.is_empty() {
        return "NULL".to_string();
    }

    if numeric && value.parse::<f64>().is_ok_and(f64::is_finite) {
        return value.to_string();
    }

    let upper = value.to_uppercase();
    if upper == "TRUE" || upper == "FALSE" || upper == "NULL" {
        return upper;
    }
    if SQL_TIME_FUNCTIONS.contains(&upper.as_str()) {
        return upper;
    }

    format!("'{}'", value.replace('\'', "''"))
}

/// Render a static (per-request constant) value.
///
/// Blank values yield `None` and are left out of the SET clause. A bare
/// function call such as `UUID()` or `DATE_ADD(NOW(), INTERVAL 1 DAY)` is
/// emitted as-is; everything else is escaped like a file value.
pub fn render_static_value(raw: &str) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }
    if is_function_call(value) {
        return Some(value.to_string());
    }
    Some(escape_value(value, false))
}

/// `name(args)` where `name` is a plain identifier and `args` is a single
/// balanced group free of quotes, statement separators and comments.
fn is_function_call(value: &str) -> bool {
    let Some((name, rest)) = value.split_once('(') else {
        return false;
    };
    let Some(args) = rest.strip_suffix(')') else {
        return false;
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    if args.contains(['\'', '"', '`', ';', '\\']) || args.contains("--") || args.contains("/*") {
        return false;
    }

    let mut depth = 0usize;
    for c in args.chars() {
        match c {
            '(' => depth += 1,
            ')' => match depth.checked_sub(1) {
                Some(d) => depth = d,
                None => return false,
            },
            _ => {}
        }
    }
    depth == 0
}

/// Why a record produced no statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Identifier column is absent from the record or blank.
    MissingIdentifier(String),
    /// Nothing left to assign after dropping absent update columns.
    NothingToUpdate,
}

/// Build one `UPDATE` statement for `record`.
///
/// Update columns missing from a short record are left out; a missing or
/// blank identifier skips the whole record since the WHERE clause would not
/// match what the user intended.
pub fn build_update(record: &StringRecord, plan: &UpdatePlan) -> Result<String, SkipReason> {
    let mut where_parts = Vec::with_capacity(plan.identifiers.len());
    for binding in &plan.identifiers {
        let value = record
            .get(binding.position)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SkipReason::MissingIdentifier(binding.file_column.clone()))?;
        where_parts.push(format!(
            "{} = {}",
            binding.db_column,
            escape_value(value, binding.numeric)
        ));
    }

    let mut set_parts = Vec::with_capacity(plan.update_columns.len() + plan.static_values.len());
    for binding in &plan.update_columns {
        if let Some(value) = record.get(binding.position) {
            set_parts.push(format!(
                "{} = {}",
                binding.db_column,
                escape_value(value, binding.numeric)
            ));
        }
    }
    for (column, rendered) in &plan.static_values {
        set_parts.push(format!("{column} = {rendered}"));
    }

    if set_parts.is_empty() {
        return Err(SkipReason::NothingToUpdate);
    }

    Ok(format!(
        "UPDATE {}.{} SET {} WHERE {};",
        plan.database,
        plan.table,
        set_parts.join(", "),
        where_parts.join(" AND ")
    ))
}
