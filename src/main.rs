//! SQL Batch Service - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Parse the command line (`serve` unless `generate` is given)
//! 2. Load configuration from environment variables
//! 3. Create the upload and output directories
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use clap::Parser;
use sql_batch_web_server::{
    AppState, Config, build_router,
    cli::{self, Cli, Command},
};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match Cli::parse().command.unwrap_or(Command::Serve) {
        Command::Serve => serve(),
        Command::Generate(args) => {
            let report = cli::run_generate(&args)?;
            println!(
                "Generated {} statements ({} rows skipped) in {} file(s):",
                report.processed_rows,
                report.skipped_rows,
                report.output_files.len()
            );
            for name in &report.output_files {
                println!("  {name}");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn serve() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    tracing::info!(
        upload_dir = %config.upload_dir,
        output_dir = %config.output_dir,
        "Configuration loaded"
    );

    let state = AppState::new(config);
    state.workspace.prepare().await?;
    tracing::info!("Workspace directories ready");

    let addr = format!("0.0.0.0:{}", state.config.server_port);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
