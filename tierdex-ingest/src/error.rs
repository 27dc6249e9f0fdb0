//! Error types for tierdex-ingest
//!
//! Severity follows the pipeline stage:
//! - [`FetchError`], [`ReconcileError`], [`PersistenceError`] are fatal and
//!   abort the run before the store is touched
//! - [`IngestError::EmptyCatalog`] is fatal unless empty catalogs are allowed
//! - [`AssetDownloadError`] is non-fatal; the pipeline logs it and moves on

use std::path::PathBuf;
use thiserror::Error;

/// Remote catalog unreachable or malformed
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network communication error
    #[error("Catalog request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Endpoint answered with a non-success status
    #[error("Catalog endpoint {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Body is not a JSON object of catalog entries
    #[error("Catalog response is malformed: {0}")]
    Parse(String),
}

/// One asset could not be downloaded
#[derive(Debug, Error)]
pub enum AssetDownloadError {
    /// Network communication error
    #[error("Asset request to {url} failed: {message}")]
    Network { url: String, message: String },

    /// Asset host answered with a non-success status (e.g. 404 for a new character)
    #[error("Asset {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    /// Local file could not be written
    #[error("Writing asset {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Incoming catalog cannot be merged without losing a record
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReconcileError {
    /// Remote catalog lists the same external id twice
    #[error("External id {0} appears more than once in the remote catalog")]
    DuplicateExternalId(String),

    /// Two distinct remote entries derive the same slug
    #[error("Slug '{slug}' is derived by both {first_id} ({first_name}) and {second_id} ({second_name})")]
    SlugCollision {
        slug: String,
        first_id: String,
        first_name: String,
        second_id: String,
        second_name: String,
    },

    /// Name slugifies to nothing (e.g. only punctuation)
    #[error("Entry {id} has name {name:?} which yields an empty slug")]
    EmptySlug { id: String, name: String },
}

/// Store could not be written
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Writing {path} failed: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Existing file could not be read back for merging
    #[error("Reading {path} failed: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: tierdex_common::Error,
    },

    #[error("Serializing catalog failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Umbrella error for an ingest run
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// Reading the existing store or configuration failed
    #[error(transparent)]
    Common(#[from] tierdex_common::Error),

    /// Remote listed no characters while the store still holds some
    #[error("Remote catalog is empty but the store holds {stored} records; refusing to empty it")]
    EmptyCatalog { stored: usize },

    /// Seed file missing or not a slug → content object
    #[error("Seed file {path} is unusable: {message}")]
    Seed { path: PathBuf, message: String },

    /// HTTP client could not be constructed
    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Result type for ingest operations
pub type IngestResult<T> = Result<T, IngestError>;
