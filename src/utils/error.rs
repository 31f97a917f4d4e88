//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading a profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Inconsistent profile: {0}")]
    Inconsistent(String),

    #[error("Call tree references unknown region {region} (profile has {count} regions)")]
    UnknownCallTreeRegion { region: usize, count: usize },
}

/// Errors that can occur while talking to the event-size estimator
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Failed to prepare estimator files: {0}")]
    Io(#[from] std::io::Error),

    #[error("Estimator command is empty")]
    EmptyCommand,

    #[error("Failed to launch `{command}`: {source}")]
    LaunchFailed {
        command: String,
        source: std::io::Error,
    },

    #[error("`{command}` exited unsuccessfully ({status})")]
    ExitStatus { command: String, status: String },
}

/// Errors that can occur while building an estimate
#[derive(Error, Debug)]
pub enum EstimatorError {
    #[error("Profile error: {0}")]
    Profile(#[from] ProfileError),
}

/// Errors that can occur on a filter toggle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("No {table} entry at index {index}")]
    OutOfRange { table: &'static str, index: usize },

    #[error("{0} cannot be excluded")]
    NotFilterable(String),

    #[error("{failed} of {total} toggles failed")]
    Batch { failed: usize, total: usize },
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
