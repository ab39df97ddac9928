//! Generated SQL file access.
//!
//! - GET /preview/{filename} - Raw SQL text for the preview modal
//! - GET /download/{filename} - Single file as an attachment
//! - GET /download_all - Every SQL file bundled into one zip

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::{error::AppError, services::archive, state::AppState};

fn attachment(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

/// Return the SQL text of one generated file.
///
/// # Response
///
/// - **Success (200 OK)**: `text/plain; charset=utf-8` body
/// - **Error (404)**: unknown file, or a name that is not a plain `.sql` file name
pub async fn preview_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state.workspace.output_file(&filename).await?;
    let content = tokio::fs::read_to_string(&path).await?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
        .into_response())
}

/// Download one generated file.
pub async fn download_file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    let path = state.workspace.output_file(&filename).await?;
    let bytes = tokio::fs::read(&path).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/sql".to_string()),
            (header::CONTENT_DISPOSITION, attachment(&filename)),
        ],
        bytes,
    )
        .into_response())
}

/// Download all generated files as `sql_statements.zip`.
///
/// An empty output directory yields an empty (but valid) archive.
pub async fn download_all(State(state): State<AppState>) -> Result<Response, AppError> {
    let files = state.workspace.output_paths().await?;
    let bytes = archive::zip_files(&files).await?;
    tracing::info!(files = files.len(), bytes = bytes.len(), "archive built");

    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, attachment(archive::ARCHIVE_NAME)),
        ],
        bytes,
    )
        .into_response())
}
