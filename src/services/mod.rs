//! Business logic services.
//!
//! Services contain the core logic separated from HTTP handlers: reading the
//! uploaded file, validating a generation job, rendering SQL, and managing
//! the workspace directories.

pub mod archive;
pub mod batch;
pub mod plan;
pub mod sql;
pub mod tabular;
pub mod workspace;
