//! Error types for the export verification pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for pipeline operations.
///
/// Only fetch and extraction failures terminate a single test's pipeline
/// early; everything else (validation misses, timeouts, spawn failures,
/// missing baselines) is encoded into the stage result structs instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Export API returned a non-success status.
    #[error("export request failed with status {status}: {body}")]
    Fetch { status: u16, body: String },

    /// Transport-level failure before any HTTP status was received.
    #[error("export request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Archive unpack failure.
    #[error("failed to extract {archive}: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    /// IO error during filesystem operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Test suite configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;
