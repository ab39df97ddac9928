//! Upload and configure response types.

use serde::{Deserialize, Serialize};

use crate::services::tabular::Format;

/// Response body for `POST /upload`.
///
/// # JSON Example
///
/// ```json
/// {
///   "success": true,
///   "filename": "images.csv",
///   "headers": ["product_id", "url"],
///   "data": [["1001", "https://cdn.example.com/1001.png"]]
/// }
/// ```
///
/// `data` rows are positional and line up with `headers`.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub filename: String,
    pub headers: Vec<String>,
    pub data: Vec<Vec<String>>,
}

/// Query string of `GET /configure`.
#[derive(Debug, Deserialize)]
pub struct ConfigureQuery {
    pub filename: Option<String>,
}

/// Response body for `GET /configure`.
///
/// Describes the uploaded file so the mapping form can offer its columns.
#[derive(Debug, Serialize)]
pub struct ConfigureResponse {
    pub filename: String,
    pub format: Format,
    pub headers: Vec<String>,
    pub preview_data: Vec<Vec<String>>,
}
