//! Strict error handling with CommandError enum
//!
//! All errors are serializable so host surfaces receive a structured
//! `{type, message}` failure instead of a bare string.

use serde::Serialize;
use thiserror::Error;

/// Command execution errors
///
/// This enum provides strict error handling for all command operations.
/// All variants are serializable for IPC communication with host UIs.
#[derive(Error, Debug, Clone, Serialize)]
#[serde(tag = "type", content = "message")]
pub enum CommandError {
    /// System I/O error (file operations, state store, etc.)
    #[error("System I/O error: {0}")]
    SystemIO(String),

    /// Invalid input or parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Clipboard operation error
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Unknown/unexpected error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<std::io::Error> for CommandError {
    fn from(err: std::io::Error) -> Self {
        CommandError::SystemIO(err.to_string())
    }
}

impl From<serde_json::Error> for CommandError {
    fn from(err: serde_json::Error) -> Self {
        CommandError::InvalidInput(format!("JSON error: {}", err))
    }
}

// Helper type alias for command results
pub type CommandResult<T> = Result<T, CommandError>;
