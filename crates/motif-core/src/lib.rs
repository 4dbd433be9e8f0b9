//! Motif Core
//!
//! Coordination layer for the Motif oracle notebook: owns the storage
//! handle, the five writing surfaces, the session manager and the autosave
//! scheduler. Hosts attach their editors and drive everything through
//! [`Notebook`].

mod config;
mod error;
mod notebook;

pub use config::Config;
pub use error::CoreError;
pub use notebook::Notebook;

pub use motif_oracle::{
    Answer, DiceType, Focus, GameRoll, GameRollResult, Modifier, OracleError, OracleRoll,
    OracleSelection,
};
pub use motif_session::{
    AcceptAll, AutosaveConfig, ContentSurface, ExportArchive, LoadConfirmation, NotebookContent,
    ReportFormat, SchedulerState, SessionBundle, SessionError, SessionEvent, SessionManager,
    SessionSummary, Surface, SurfaceSet, TextSurface, AUTO_SAVE, BACKUP_SAVE,
};
pub use motif_storage::{Database, KeyValueStore, MemoryStore, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
