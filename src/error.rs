//! Error types shared across the crate.
//!
//! Each subsystem gets its own enum so callers can decide which failures are
//! fatal. Only `CatalogError` is ever shown to the user as a blocking error.

use std::io;

use thiserror::Error;

/// Failures of the local key/value persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] io::Error),

    #[error("store encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Failures talking to the hosted object storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage endpoint is not configured (set storage.endpoint)")]
    Unconfigured,

    #[error("storage request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("storage returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("storage io error: {0}")]
    Io(#[from] io::Error),
}

/// Failures that prevent a catalog from being produced at all.
///
/// Per-group listing failures are not represented here: they degrade the
/// catalog instead of failing it.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid catalog configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("could not start catalog worker: {0}")]
    Spawn(#[source] io::Error),
}

/// Failures loading or driving a single playback resource.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("failed to fetch media: {0}")]
    Fetch(#[from] StorageError),

    #[error("media io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to decode media: {0}")]
    Decode(String),

    #[error("audio output unavailable: {0}")]
    Output(String),

    #[error("no media loaded")]
    NotLoaded,
}

/// Failures of the batch uploader that abort the whole run.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload source {0} is not a directory")]
    NotADirectory(String),

    #[error("upload io error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to write upload report: {0}")]
    Report(#[from] serde_json::Error),
}
