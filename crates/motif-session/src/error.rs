//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] motif_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session name cannot be empty")]
    EmptyName,

    #[error("Content surfaces are not ready")]
    SurfacesNotReady,

    #[error("Autosave needs a running tokio runtime")]
    NoRuntime,

    #[error("Unknown report format: {0}")]
    UnknownFormat(String),
}

impl From<zip::result::ZipError> for SessionError {
    fn from(err: zip::result::ZipError) -> Self {
        SessionError::Archive(err.to_string())
    }
}
