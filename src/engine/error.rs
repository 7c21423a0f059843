use std::path::PathBuf;
use thiserror::Error;

use crate::models::ModelError;

/// Failures surfaced by storage backends. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("malformed storage document: {0}")]
    Malformed(String),

    #[error("type `{0}` has no table mapping")]
    Unmapped(String),
}

impl StorageError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StorageError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        StorageError::Connection(message.into())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
