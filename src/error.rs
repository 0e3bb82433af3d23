// src/error.rs

//! Error types for pkgapp

use thiserror::Error;

/// Errors raised by the status store, package queries and reconciliation
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid configuration (apps directory, config file)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// File read/write failure
    #[error("I/O error: {0}")]
    IoError(String),

    /// External command (dpkg, apt-cache, categoryedit) failed
    #[error("Command failed: {0}")]
    CommandError(String),

    /// Malformed packages, category or status file
    #[error("Parse error: {0}")]
    ParseError(String),

    /// App or file not found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Analytics delivery failure (never surfaced past the notifier)
    #[error("Analytics error: {0}")]
    AnalyticsError(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err.to_string())
    }
}

/// Result alias used throughout the library
pub type Result<T> = std::result::Result<T, Error>;
