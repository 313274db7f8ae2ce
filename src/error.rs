//! Error types for compose-middleware

use std::path::PathBuf;
use thiserror::Error;

/// Result type for compose-middleware operations
pub type Result<T> = std::result::Result<T, MiddlewareError>;

/// Message reported when a request names a service the compose file does not declare
pub const NO_SUCH_SERVICE: &str = "No such service";

/// compose-middleware error types
#[derive(Error, Debug)]
pub enum MiddlewareError {
    #[error("Failed to read config file {path}: {source}")]
    ConfigLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Compose file parse error: {0}")]
    ComposeParse(String),

    #[error("No such service: {0}")]
    UnknownService(String),

    #[error("Failed to start {command}: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed: {reason}")]
    CommandFailed { command: String, reason: String },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
