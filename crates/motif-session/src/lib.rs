//! Motif Session Management
//!
//! - A session is a named snapshot of the five notebook surfaces
//! - All sessions live in one registry blob, rewritten whole on every change
//! - "Auto Save" and "Backup Save" are written by the autosave scheduler
//! - Sessions travel between machines as single-entry zip archives

pub mod archive;
mod bundle;
mod error;
mod manager;
mod registry;
pub mod report;
mod scheduler;
mod store;
mod surface;

pub use archive::ExportArchive;
pub use bundle::{NotebookContent, SessionBundle};
pub use error::SessionError;
pub use manager::{AcceptAll, LoadConfirmation, SessionEvent, SessionManager};
pub use registry::{SessionRegistry, SessionSummary, AUTO_SAVE, BACKUP_SAVE, RESERVED_NAMES};
pub use report::ReportFormat;
pub use scheduler::{AutosaveConfig, AutosaveHandle, AutosaveScheduler, SchedulerState};
pub use store::{RegistryStore, LEGACY_AUTO_SAVE_KEY, LEGACY_CONTENT_KEY, REGISTRY_KEY};
pub use surface::{ContentSurface, Surface, SurfaceSet, TextSurface};

pub type Result<T> = std::result::Result<T, SessionError>;
