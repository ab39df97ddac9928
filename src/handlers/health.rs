//! Health check endpoint for service monitoring.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{error::AppError, state::AppState};

/// Health check response.
///
/// Returns service status and workspace availability.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when both workspace directories exist, `degraded` otherwise
    pub status: String,

    /// Upload directory status
    pub upload_dir: String,

    /// Output directory status
    pub output_dir: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

fn dir_status(ready: bool) -> String {
    let status = if ready { "ready" } else { "missing" };
    status.to_string()
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "status": "healthy",
///   "upload_dir": "ready",
///   "output_dir": "ready",
///   "timestamp": "2025-12-21T19:00:00Z"
/// }
/// ```
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    let upload_ready = tokio::fs::try_exists(state.workspace.upload_dir()).await?;
    let output_ready = tokio::fs::try_exists(state.workspace.output_dir()).await?;

    Ok(Json(HealthResponse {
        status: if upload_ready && output_ready {
            "healthy"
        } else {
            "degraded"
        }
        .to_string(),
        upload_dir: dir_status(upload_ready),
        output_dir: dir_status(output_ready),
        timestamp: Utc::now(),
    }))
}
