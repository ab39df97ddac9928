//! SQL generation handler.
//!
//! - POST /generate_sql - Validate a mapping job and write batched SQL files

use std::time::Instant;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::generate::{GenerateRequest, GenerateResponse, GenerationSummary},
    services::{batch, plan::UpdatePlan, tabular::ColumnIndex},
    state::AppState,
};

/// Generate SQL files from the uploaded file.
///
/// # Request Body
///
/// See [`GenerateRequest`].
///
/// # Process
///
/// 1. Locate the upload named in the request
/// 2. Validate the job against the file's columns
/// 3. Stream records into `{stem}_part_{NNN}.sql` files in a staging directory
/// 4. Swap the staging directory in as the new output
/// 5. Remember the run summary for `GET /result`
///
/// The previous output and its summary survive any failed request, including
/// runs that fail halfway through the file or produce no statement.
///
/// # Response
///
/// - **Success (200 OK)**:
///
/// ```json
/// {
///   "success": true,
///   "redirect_url": "/result",
///   "output_files": ["images_part_001.sql"],
///   "processed_rows": 2,
///   "summary": { "run_id": "...", "processed_rows": 2, "skipped_rows": 0, ... }
/// }
/// ```
///
/// - **Error (400)**: invalid job, or no statement could be generated
/// - **Error (404)**: the named upload does not exist
/// - **Error (422)**: the upload cannot be parsed
pub async fn generate_sql(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(request) = payload?;
    if request.filename.trim().is_empty() {
        return Err(AppError::InvalidRequest(
            "Missing required field: filename".to_string(),
        ));
    }
    tracing::info!(
        file = %request.filename,
        database = %request.db_name,
        table = %request.table_name,
        batch_size = request.batch_size,
        "generate request received"
    );

    // Held until the run finishes so a concurrent upload cannot replace the input.
    let _guard = state.workspace.lock().await;

    let upload = state
        .workspace
        .current_upload(Some(&request.filename))
        .await?;

    let plan = {
        let path = upload.path.clone();
        let format = upload.format;
        tokio::task::spawn_blocking(move || -> Result<UpdatePlan, AppError> {
            let columns = ColumnIndex::from_file(&path, format, request.file_has_header)?;
            UpdatePlan::compile(request, &columns)
        })
        .await??
    };

    let started_at = Utc::now();
    let timer = Instant::now();
    let staging = state.workspace.begin_staging().await?;
    let run = {
        let path = upload.path.clone();
        let format = upload.format;
        tokio::task::spawn_blocking(move || batch::generate(&path, format, &plan, &staging))
            .await?
    };

    let report = match run {
        Ok(report) if !report.output_files.is_empty() => report,
        outcome => {
            if let Err(err) = state.workspace.discard_staging().await {
                tracing::warn!(error = %err, "failed to remove staged output");
            }
            return Err(outcome.err().unwrap_or(AppError::NothingGenerated));
        }
    };
    state.workspace.publish_staging().await?;
    let elapsed_ms = timer.elapsed().as_millis() as i64;

    let summary = GenerationSummary {
        run_id: Uuid::new_v4(),
        source_file: upload.filename,
        processed_rows: report.processed_rows,
        skipped_rows: report.skipped_rows,
        file_count: report.output_files.len(),
        output_files: report.output_files,
        started_at,
        finished_at: Utc::now(),
        duration_ms: elapsed_ms,
        rows_per_second: report.processed_rows * 1000 / elapsed_ms.max(1) as u64,
    };

    *state.last_run.write().await = Some(summary.clone());

    Ok(Json(summary.into()))
}
