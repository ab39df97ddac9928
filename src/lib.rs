//! SQL Batch Service
//!
//! Backend for the CSV/TSV to SQL `UPDATE` converter. The browser uploads a
//! tabular file, maps file columns to database columns, and downloads the
//! generated statements split into fixed-size batch files.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Input**: CSV / TSV via the `csv` crate, parsed on blocking threads
//! - **Output**: `.sql` script files in a local output directory, zip bundling
//! - **Format**: JSON requests/responses, raw text for SQL previews
//! - **CLI**: `clap` subcommands; `generate` runs a YAML job file without the server

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

pub use app::build_router;
pub use config::Config;
pub use state::AppState;
