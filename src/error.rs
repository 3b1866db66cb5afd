use std::path::PathBuf;
use thiserror::Error;

/// The main error type for inatindex operations.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to access {path}: {source}")]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse manifest JSON from {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Inconsistent manifest: {message}")]
    ManifestConsistency { message: String },

    #[error("Index {index} out of range for dataset of length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Failed to decode image {path}: {source}")]
    ImageDecode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid split '{value}' (expected one of: train, val, test)")]
    InvalidSplit { value: String },

    #[error("Failed to parse config {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    #[error("Data acquisition failed for {root}: {message}")]
    FetchFailed { root: PathBuf, message: String },

    #[error("Failed to write CSV to {path}: {source}")]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl DatasetError {
    pub(crate) fn consistency(message: impl Into<String>) -> Self {
        DatasetError::ManifestConsistency {
            message: message.into(),
        }
    }
}
