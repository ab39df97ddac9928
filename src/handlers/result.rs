//! Result page data.

use axum::{Json, extract::State};

use crate::{error::AppError, models::result::ResultResponse, state::AppState};

/// List generated files with the last run's summary.
///
/// # Endpoint
///
/// `GET /result`
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "files": [
///     { "name": "images_part_001.sql", "size": 10482, "lines": 103, "sha256": "..." }
///   ],
///   "total_rows": 100,
///   "file_count": 1,
///   "summary": { "run_id": "...", "processed_rows": 100, ... }
/// }
/// ```
///
/// `summary` is `null` until a run has completed since the server started.
pub async fn show_result(State(state): State<AppState>) -> Result<Json<ResultResponse>, AppError> {
    let files = state.workspace.list_outputs().await?;
    let summary = state.last_run.read().await.clone();

    Ok(Json(ResultResponse {
        total_rows: summary.as_ref().map_or(0, |s| s.processed_rows),
        file_count: files.len(),
        files,
        summary,
    }))
}
