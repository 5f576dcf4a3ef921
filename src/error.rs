//! Error types for the asset pipeline
//!
//! Per-asset failures (`FetchError`, `TransformError`) are recovered by the
//! orchestrator and recorded in the run report. Only `PipelineError` aborts
//! a run.

use std::io;
use std::path::{Path, PathBuf};

/// Failure while retrieving a remote asset
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Server answered with a non-200 status
    #[error("unexpected HTTP status {0}")]
    BadStatus(u16),

    /// Network-level failure (DNS, connection reset, timeout)
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// Local write failure while streaming the body to disk
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        FetchError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Failure while post-processing a fetched image
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    /// Malformed or unsupported image data
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Re-encoding the processed buffer failed
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("i/o error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while building or writing the image manifest
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write manifest {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while decoding the embedded verification token
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("failed to decode verification token: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("verification token is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("verification token has no host segment")]
    Malformed,
}

/// Process-level failure that aborts the whole run
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to prepare output directories: {0}")]
    Setup(#[from] io::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}
