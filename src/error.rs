//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Application-wide error type.
///
/// This enum represents all possible errors that can occur in the application.
/// Each variant maps to a specific HTTP status code and error message.
///
/// # Error Categories
///
/// - **Storage Errors**: file system failures in the upload or output directory
/// - **Input Errors**: the uploaded file cannot be read as CSV/TSV
/// - **Upload Errors**: missing file part, empty filename, unsupported extension
/// - **Resource Errors**: requested upload or SQL file does not exist
/// - **Validation Errors**: invalid generation request
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Reading or writing the workspace failed.
    ///
    /// Returns HTTP 500 and hides the details from the client.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The uploaded file could not be parsed (bad quoting, invalid UTF-8, ...).
    ///
    /// Returns HTTP 422 Unprocessable Entity.
    #[error("Error reading file: {0}")]
    Csv(#[from] csv::Error),

    /// The multipart body was malformed or exceeded the size limit.
    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    /// Building the zip archive failed.
    #[error("Archive error: {0}")]
    Archive(#[from] async_zip::error::ZipError),

    /// A blocking worker panicked or was cancelled.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Multipart body has no `file` field.
    #[error("No file part")]
    NoFilePart,

    /// The `file` field has an empty filename.
    #[error("No selected file")]
    NoSelectedFile,

    /// Only `.csv` and `.tsv` files are accepted.
    ///
    /// Returns HTTP 415 Unsupported Media Type.
    #[error("File type not allowed")]
    FileTypeNotAllowed,

    /// Requested file does not exist in the workspace.
    ///
    /// Returns HTTP 404 Not Found.
    #[error("File not found: {0}")]
    FileNotFound(String),

    /// Nothing has been uploaded yet.
    #[error("Please upload a file first")]
    NoUpload,

    /// The run finished without writing a single statement.
    #[error("No SQL files were generated. Please check your input file and configuration.")]
    NothingGenerated,

    /// Request body or parameters are invalid.
    ///
    /// Returns HTTP 400 Bad Request.
    /// The String contains details about what was invalid.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

/// Convert AppError into an HTTP response.
///
/// # Response Format
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "success": false,
///   "message": "Human-readable error message",
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// The browser client only reads the top-level `message`.
///
/// # Status Code Mapping
///
/// - `NoFilePart`, `NoSelectedFile`, `InvalidRequest`, `NothingGenerated` → 400 Bad Request
/// - `Multipart` → status chosen by axum (400, or 413 when over the body limit)
/// - `FileNotFound`, `NoUpload` → 404 Not Found
/// - `FileTypeNotAllowed` → 415 Unsupported Media Type
/// - `Csv` → 422 Unprocessable Entity
/// - `Io`, `Archive`, `Task` → 500 Internal Server Error (hides details from client)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AppError::NoFilePart => (StatusCode::BAD_REQUEST, "no_file_part", self.to_string()),
            AppError::NoSelectedFile => (
                StatusCode::BAD_REQUEST,
                "no_selected_file",
                self.to_string(),
            ),
            AppError::Multipart(ref err) => (err.status(), "invalid_upload", err.body_text()),
            AppError::FileTypeNotAllowed => (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "file_type_not_allowed",
                self.to_string(),
            ),
            AppError::FileNotFound(_) => {
                (StatusCode::NOT_FOUND, "file_not_found", self.to_string())
            }
            AppError::NoUpload => (StatusCode::NOT_FOUND, "no_upload", self.to_string()),
            AppError::NothingGenerated => (
                StatusCode::BAD_REQUEST,
                "nothing_generated",
                self.to_string(),
            ),
            AppError::InvalidRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "invalid_request", msg.clone())
            }
            AppError::Csv(_) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unreadable_file",
                self.to_string(),
            ),
            AppError::Io(_) | AppError::Archive(_) | AppError::Task(_) => {
                tracing::error!(error = %self, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
