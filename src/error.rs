//! Error types for Orchestra
//!
//! This module defines all error types used throughout the shell.
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.
//!
//! Only [`LoadFailure`] is recovered from (a broken tool is skipped at
//! startup). Every other error ends the process with exit status 1.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for Orchestra operations.
#[derive(Error, Debug)]
pub enum OrchestraError {
    /// The settings file does not exist; the shell refuses to start.
    #[error("Unable to load {}. Please run: {remediation}", .path.display())]
    ConfigMissing {
        path: PathBuf,
        remediation: String,
    },

    /// Configuration-related errors (malformed settings, invalid values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Tool manifest errors (missing fields, invalid names, bad entry, etc.)
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// Tool construction or invocation errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// A tool process exited unsuccessfully
    #[error("Tool '{name}' exited with {}", describe_code(.code))]
    ToolFailed { name: String, code: Option<i32> },

    /// Resource not found (tools, scripts, libraries, etc.)
    #[error("Not found: {0}")]
    NotFound(String),

    /// `--tool` named nothing in the registry
    #[error("Invalid tool name provided!")]
    InvalidTool(String),

    /// An administrative external command exited unsuccessfully
    #[error("Command '{command}' failed with {}", describe_code(.code))]
    ExternalCommand { command: String, code: Option<i32> },

    /// An administrative script is not present on disk
    #[error("{} not found", .0.display())]
    ScriptMissing(PathBuf),

    /// An administrative script exited unsuccessfully
    #[error("{script} script failed with {}", describe_code(.code))]
    ScriptFailed { script: String, code: Option<i32> },

    /// Ctrl-C at a blocking read
    #[error("Interrupted")]
    Interrupted,

    /// Line editor failures other than interrupt/EOF
    #[error("Input error: {0}")]
    Input(String),

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("error code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// A tool that could not be loaded. The registry logs and skips these.
#[derive(Error, Debug)]
#[error("Failed to load tool {}: {source}", .path.display())]
pub struct LoadFailure {
    /// Entry point that failed to load.
    pub path: PathBuf,
    /// Underlying cause.
    #[source]
    pub source: OrchestraError,
}

/// A specialized `Result` type for Orchestra operations.
pub type Result<T> = std::result::Result<T, OrchestraError>;
