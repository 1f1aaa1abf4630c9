//! Error types for the signing pipeline.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SignError>;

#[derive(Debug, Error)]
pub enum SignError {
    #[error("File does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("{context}\n{output}")]
    ToolFailed {
        /// What was being attempted, e.g. "Unable to codesign installer Foo.pkg"
        context: String,
        /// Combined stdout+stderr captured from the tool.
        output: String,
    },

    #[error("Unable to {action} {}: {source}", .path.display())]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parsing error: {0}")]
    Toml(#[from] toml::de::Error),
}
