//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (multipart body, JSON body, URL params)
//! 2. Delegates to the services for file handling and SQL generation
//! 3. Returns HTTP response (JSON, SQL text, file download)

/// Preview and download of generated files
pub mod files;
/// SQL generation
pub mod generate;
/// Service health
pub mod health;
/// Result listing
pub mod result;
/// Upload and configure
pub mod upload;
