use thiserror::Error;

/// Errors from the durable local stores (watchlist slot, offline database).
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize stored data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Show id {0} is out of range for storage")]
    IdOutOfRange(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// A specialized `Result` type for local storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
