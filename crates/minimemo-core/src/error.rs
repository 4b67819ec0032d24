//! Error types for minimemo-core

use thiserror::Error;

/// Result type alias using minimemo-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in minimemo-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted collection could not be decoded
    #[error("Failed to decode persisted {key}: {message}")]
    PersistenceDecode { key: String, message: String },

    /// Persistence backend write failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// The remote calendar fetch failed
    #[error("Remote fetch failed: {0}")]
    RemoteFetch(String),

    /// Calendar sync attempted without a stored credential
    #[error("Calendar sync requires authentication")]
    AuthRequired,

    /// Another sync is already running against the same store
    #[error("A calendar sync is already in progress")]
    SyncInProgress,
}
