//! Application configuration management.
//!
//! This module handles loading configuration from environment variables.
//! It uses the `envy` crate to automatically deserialize environment variables into a type-safe struct.

use std::path::PathBuf;

use serde::Deserialize;

/// Application configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `SERVER_PORT` (optional): HTTP server port, defaults to 5000
/// - `UPLOAD_DIR` (optional): where the uploaded file is kept, defaults to `uploads`
/// - `OUTPUT_DIR` (optional): where generated SQL files are written, defaults to `output`
/// - `STATIC_DIR` (optional): directory served under `/static`, defaults to `static`
/// - `MAX_UPLOAD_BYTES` (optional): request body limit for uploads, defaults to 64 MiB
/// - `PREVIEW_ROWS` (optional): data rows returned with an upload preview, defaults to 5
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_port")]
    pub server_port: u16,

    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    #[serde(default = "default_preview_rows")]
    pub preview_rows: usize,
}

/// Default port if SERVER_PORT environment variable is not set.
fn default_port() -> u16 {
    5000
}

fn default_upload_dir() -> String {
    "uploads".to_string()
}

fn default_output_dir() -> String {
    "output".to_string()
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_max_upload_bytes() -> usize {
    64 * 1024 * 1024
}

fn default_preview_rows() -> usize {
    5
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// This method first attempts to load a `.env` file (which is optional),
    /// then reads environment variables and deserializes them into a Config struct.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable value cannot be parsed
    /// into the expected type (e.g. a non-numeric `SERVER_PORT`).
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();

        // Field names are automatically converted: upload_dir -> UPLOAD_DIR
        envy::from_env::<Config>()
    }

    /// Configuration rooted at `root`, with every other setting at its default.
    ///
    /// Used by tests and embedders that want an isolated workspace.
    pub fn rooted_at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            server_port: default_port(),
            upload_dir: root.join("uploads").to_string_lossy().into_owned(),
            output_dir: root.join("output").to_string_lossy().into_owned(),
            static_dir: root.join("static").to_string_lossy().into_owned(),
            max_upload_bytes: default_max_upload_bytes(),
            preview_rows: default_preview_rows(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_env_is_empty() {
        let config: Config = envy::from_iter(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.upload_dir, "uploads");
        assert_eq!(config.output_dir, "output");
        assert_eq!(config.preview_rows, 5);
        assert_eq!(config.max_upload_bytes, 64 * 1024 * 1024);
    }

    #[test]
    fn env_values_override_defaults() {
        let vars = vec![
            ("SERVER_PORT".to_string(), "8080".to_string()),
            ("OUTPUT_DIR".to_string(), "/tmp/sql".to_string()),
            ("PREVIEW_ROWS".to_string(), "10".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.output_dir, "/tmp/sql");
        assert_eq!(config.preview_rows, 10);
        assert_eq!(config.upload_dir, "uploads");
    }
}
