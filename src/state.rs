//! Shared application state.
//!
//! Cloned into every handler via axum's `State` extractor. All fields are
//! reference-counted, so cloning is cheap.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{config::Config, models::generate::GenerationSummary, services::workspace::Workspace};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub workspace: Arc<Workspace>,
    /// Summary of the most recent generation run since startup.
    pub last_run: Arc<RwLock<Option<GenerationSummary>>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let workspace = Workspace::new(&config.upload_dir, &config.output_dir);
        Self {
            config: Arc::new(config),
            workspace: Arc::new(workspace),
            last_run: Arc::new(RwLock::new(None)),
        }
    }
}
