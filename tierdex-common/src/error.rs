//! Common error types for tierdex

use std::path::PathBuf;
use thiserror::Error;

/// Common result type for tierdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the tierdex crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Catalog file exists but is not a valid record list
    #[error("Malformed catalog {path}: {source}")]
    MalformedCatalog {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),
}
