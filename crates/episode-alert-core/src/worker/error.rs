use thiserror::Error;

use super::offline::WorkerState;
use crate::error::StoreError;

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid request method: {0}")]
    InvalidMethod(String),

    #[error("Network unreachable: {0}")]
    Unreachable(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to (de)serialize cache entry: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid cache store name: {0}")]
    InvalidName(String),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to precache {path}: {reason}")]
    Precache { path: String, reason: String },

    #[error("Worker is {actual}, expected {expected}")]
    InvalidState {
        expected: WorkerState,
        actual: WorkerState,
    },

    #[error("Offline document {0} is not cached")]
    OfflineDocumentMissing(String),

    #[error("Host operation failed: {0}")]
    Host(String),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}
