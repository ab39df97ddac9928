//! File upload and column discovery handlers.
//!
//! This module implements:
//! - POST /upload - Store a CSV/TSV file and return a preview
//! - GET /configure - Describe the stored file for the mapping form

use axum::{
    Json,
    extract::{Multipart, Query, State, multipart::MultipartRejection},
};

use crate::{
    error::AppError,
    models::upload::{ConfigureQuery, ConfigureResponse, UploadResponse},
    services::{
        tabular::{Sample, read_sample},
        workspace::Upload,
    },
    state::AppState,
};

/// Read the preview of `upload` off the async runtime.
async fn sample_of(upload: &Upload, limit: usize) -> Result<Sample, AppError> {
    let path = upload.path.clone();
    let format = upload.format;
    tokio::task::spawn_blocking(move || read_sample(&path, format, limit)).await?
}

/// Upload a tabular file.
///
/// # Endpoint
///
/// `POST /upload` (multipart/form-data, field `file`)
///
/// Replaces any previous upload. The client navigates to
/// `/configure?filename=<filename>` afterwards.
///
/// # Response
///
/// - **Success (200 OK)**: stored filename, headers and the first data rows
/// - **Error (400)**: no `file` field, or empty filename
/// - **Error (415)**: not a `.csv` / `.tsv` file
/// - **Error (422)**: file cannot be parsed
///
/// ```json
/// {
///   "success": true,
///   "filename": "images.csv",
///   "headers": ["product_id", "url"],
///   "data": [["1001", "https://cdn.example.com/1001.png"]]
/// }
/// ```
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let original_name = field.file_name().unwrap_or_default().to_string();
        let contents = field.bytes().await?;

        let upload = {
            let _guard = state.workspace.lock().await;
            state.workspace.store_upload(&original_name, &contents).await?
        };
        let sample = sample_of(&upload, state.config.preview_rows).await?;

        return Ok(Json(UploadResponse {
            success: true,
            filename: upload.filename,
            headers: sample.headers,
            data: sample.rows,
        }));
    }

    Err(AppError::NoFilePart)
}

/// Describe the uploaded file.
///
/// # Endpoint
///
/// `GET /configure?filename=<name>`
///
/// Without `filename`, the current upload is used.
///
/// # Response
///
/// - **Success (200 OK)**: format, headers and preview rows
/// - **Error (404)**: nothing uploaded, or the named file is not the upload
///
/// ```json
/// {
///   "filename": "images.tsv",
///   "format": "tsv",
///   "headers": ["product_id", "url"],
///   "preview_data": [["1001", "https://cdn.example.com/1001.png"]]
/// }
/// ```
pub async fn configure(
    State(state): State<AppState>,
    Query(query): Query<ConfigureQuery>,
) -> Result<Json<ConfigureResponse>, AppError> {
    let upload = state
        .workspace
        .current_upload(query.filename.as_deref())
        .await?;
    let sample = sample_of(&upload, state.config.preview_rows).await?;

    Ok(Json(ConfigureResponse {
        filename: upload.filename,
        format: upload.format,
        headers: sample.headers,
        preview_data: sample.rows,
    }))
}
