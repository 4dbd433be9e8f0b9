//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] motif_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] motif_session::SessionError),

    #[error("Oracle error: {0}")]
    Oracle(#[from] motif_oracle::OracleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Notebook not initialized")]
    NotInitialized,
}
