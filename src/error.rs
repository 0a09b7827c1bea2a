//! Error types for tapreporter

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for tapreporter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tapreporter
///
/// None of these describe test outcomes; failing tests are reported on the
/// TAP stream, not raised.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file error or invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A configuration file already exists where one was to be created.
    #[error("Configuration already exists at {0}")]
    ConfigExists(PathBuf),

    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Diagnostic block could not be serialized.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Other error with custom message.
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Other(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Other(s.to_string())
    }
}
