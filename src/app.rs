//! HTTP router assembly.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{handlers, state::AppState};

/// Build the application router.
///
/// # Routes
///
/// - `POST /upload`, `GET /configure` - upload and inspect the input file
/// - `POST /generate_sql` - run a generation job
/// - `GET /result`, `GET /preview/{filename}`, `GET /download/{filename}`,
///   `GET /download_all` - inspect and fetch the output
/// - `GET /health` - service status
/// - `/static/*` - browser assets from the configured static directory
pub fn build_router(state: AppState) -> Router {
    let static_files = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/upload", post(handlers::upload::upload_file))
        .route("/configure", get(handlers::upload::configure))
        .route("/generate_sql", post(handlers::generate::generate_sql))
        .route("/result", get(handlers::result::show_result))
        .route("/preview/{filename}", get(handlers::files::preview_file))
        .route("/download/{filename}", get(handlers::files::download_file))
        .route("/download_all", get(handlers::files::download_all))
        .nest_service("/static", static_files)
        // Multipart uploads are bounded by config rather than axum's 2 MB default
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
