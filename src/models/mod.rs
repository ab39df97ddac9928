//! Request and response types exchanged with the browser client, plus the
//! job file read by the command-line generator.

/// SQL generation job and run summary
pub mod generate;
/// Generated file listing
pub mod result;
/// Upload and configure payloads
pub mod upload;
/// YAML job file for command-line runs
pub mod job;
