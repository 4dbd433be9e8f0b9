//! Session Manager
//!
//! Save, load, delete, export and import of named sessions. Every mutation
//! re-reads the registry, changes it and writes it back whole.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::sync::broadcast;

use motif_storage::KeyValueStore;

use crate::archive::{self, ExportArchive};
use crate::bundle::SessionBundle;
use crate::error::SessionError;
use crate::registry::{is_reserved, SessionRegistry, SessionSummary};
use crate::report::{self, ReportFormat};
use crate::store::RegistryStore;
use crate::surface::SurfaceSet;
use crate::Result;

const EVENT_CAPACITY: usize = 64;

/// Asked before a load replaces the current notebook content.
pub trait LoadConfirmation: Send + Sync {
    fn confirm_load(&self, session_name: &str) -> bool;
}

/// Confirms every load.
pub struct AcceptAll;

impl LoadConfirmation for AcceptAll {
    fn confirm_load(&self, _session_name: &str) -> bool {
        true
    }
}

/// Emitted after each successful operation, for toasts and picker refreshes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Saved {
        name: String,
        timestamp: DateTime<Utc>,
        /// Written by the autosave scheduler under a reserved name
        automatic: bool,
    },
    Loaded {
        name: String,
    },
    Deleted {
        name: String,
    },
    Imported {
        name: String,
    },
}

pub struct SessionManager {
    store: RegistryStore,
    surfaces: SurfaceSet,
    /// Serializes read-modify-write cycles on the registry
    registry_lock: Arc<Mutex<()>>,
    confirmation: Arc<RwLock<Arc<dyn LoadConfirmation>>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionManager {
    pub fn new(kv: Arc<dyn KeyValueStore>, surfaces: SurfaceSet) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            store: RegistryStore::new(kv),
            surfaces,
            registry_lock: Arc::new(Mutex::new(())),
            confirmation: Arc::new(RwLock::new(Arc::new(AcceptAll))),
            events,
        }
    }

    /// One-time startup work: migrate content saved by older releases.
    pub fn initialize(&self) -> Result<bool> {
        let _guard = self.registry_lock.lock();
        let migrated = self.store.migrate_legacy().map_err(|e| {
            tracing::error!(error = %e, "Legacy content migration failed");
            e
        })?;

        let registry = self.store.read_registry();
        tracing::info!(
            sessions = registry.len(),
            migrated,
            "Initialized session storage"
        );

        Ok(migrated)
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    pub fn set_confirmation(&self, hook: Arc<dyn LoadConfirmation>) {
        *self.confirmation.write() = hook;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Fresh read of the persisted registry
    pub fn registry(&self) -> SessionRegistry {
        self.store.read_registry()
    }

    pub fn list(&self) -> Vec<SessionSummary> {
        self.registry().summaries()
    }

    pub fn get(&self, name: &str) -> Result<SessionBundle> {
        self.registry()
            .get(name)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(name.to_string()))
    }

    /// Whether saving under `name` replaces a user's save. Reserved names
    /// are overwritten without asking.
    pub fn would_overwrite(&self, name: &str) -> bool {
        !is_reserved(name) && self.registry().contains(name)
    }

    /// Save the live notebook under `name`, waiting for the surfaces first.
    pub async fn save(&self, name: &str) -> Result<SessionBundle> {
        validate_name(name)?;
        self.surfaces.ready().await;
        self.save_now(name)
    }

    /// Save without waiting; fails with `SurfacesNotReady` if an editor is
    /// missing.
    pub fn save_now(&self, name: &str) -> Result<SessionBundle> {
        validate_name(name)?;
        let bundle = SessionBundle::new(self.surfaces.snapshot()?);

        {
            let _guard = self.registry_lock.lock();
            let mut registry = self.store.read_registry();
            registry.insert(name, bundle.clone());
            self.persist(&registry, "save", name)?;
        }

        let automatic = is_reserved(name);
        tracing::info!(session_name = %name, automatic, "Saved session");
        self.emit(SessionEvent::Saved {
            name: name.to_string(),
            timestamp: bundle.timestamp,
            automatic,
        });

        Ok(bundle)
    }

    /// Replace the notebook content with the session saved as `name`.
    ///
    /// Returns `false` when no such session exists or the load was declined.
    pub async fn load(&self, name: &str, skip_confirmation: bool) -> Result<bool> {
        self.surfaces.ready().await;

        let bundle = match self.store.read_registry().get(name) {
            Some(bundle) => bundle.clone(),
            None => {
                tracing::debug!(session_name = %name, "No session to load");
                return Ok(false);
            }
        };

        if !skip_confirmation {
            let hook = Arc::clone(&*self.confirmation.read());
            if !hook.confirm_load(name) {
                tracing::debug!(session_name = %name, "Load declined");
                return Ok(false);
            }
        }

        self.surfaces.apply(&bundle.content)?;

        tracing::info!(session_name = %name, "Loaded session");
        self.emit(SessionEvent::Loaded {
            name: name.to_string(),
        });

        Ok(true)
    }

    /// Remove the session saved as `name`. Returns `false` if there was none.
    pub fn delete(&self, name: &str) -> Result<bool> {
        {
            let _guard = self.registry_lock.lock();
            let mut registry = self.store.read_registry();
            if registry.remove(name).is_none() {
                return Ok(false);
            }
            self.persist(&registry, "delete", name)?;
        }

        tracing::info!(session_name = %name, "Deleted session");
        self.emit(SessionEvent::Deleted {
            name: name.to_string(),
        });

        Ok(true)
    }

    /// Clear all five surfaces. Saved sessions are untouched.
    pub fn new_session(&self) -> Result<()> {
        self.surfaces.clear()?;
        tracing::info!("Started new session");
        Ok(())
    }

    /// Pack the live notebook content into `MotifNotebook-{name}.zip`.
    pub async fn export(&self, name: &str) -> Result<ExportArchive> {
        validate_name(name)?;
        self.surfaces.ready().await;

        let bundle = SessionBundle::new(self.surfaces.snapshot()?);
        let json = bundle.to_json_pretty()?;
        let bytes = archive::write_single_entry(&format!("{name}.json"), &json)?;

        tracing::info!(session_name = %name, bytes = bytes.len(), "Exported session");

        Ok(ExportArchive {
            file_name: format!("MotifNotebook-{name}.zip"),
            bytes,
        })
    }

    /// Store the bundle inside an exported archive and load it.
    ///
    /// `suggested_name` is the uploaded file name; see
    /// [`archive::derive_import_name`]. Returns the name it was stored under.
    pub async fn import(&self, archive_bytes: &[u8], suggested_name: &str) -> Result<String> {
        let (entry_name, text) = archive::read_first_entry(archive_bytes).map_err(|e| {
            tracing::warn!(error = %e, "Rejected session archive");
            e
        })?;
        let bundle: SessionBundle = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(entry = %entry_name, error = %e, "Archive entry is not a session");
            e
        })?;

        let name = archive::derive_import_name(suggested_name, &entry_name);

        {
            let _guard = self.registry_lock.lock();
            let mut registry = self.store.read_registry();
            registry.insert(name.clone(), bundle);
            self.persist(&registry, "import", &name)?;
        }

        tracing::info!(session_name = %name, "Imported session");
        self.emit(SessionEvent::Imported { name: name.clone() });

        // The user just picked this file, so the load is not confirmed again
        self.load(&name, true).await?;
        Ok(name)
    }

    /// Render the live notebook as a report packed into `MotifReport-{name}.zip`.
    pub async fn export_report(&self, name: &str, format: ReportFormat) -> Result<ExportArchive> {
        validate_name(name)?;
        self.surfaces.ready().await;

        let content = self.surfaces.snapshot()?;
        let text = report::generate_report(&content, format, Utc::now());
        let entry = format!("{name}.{}", format.extension());
        let bytes = archive::write_single_entry(&entry, &text)?;

        tracing::info!(session_name = %name, format = %format, "Exported session report");

        Ok(ExportArchive {
            file_name: format!("MotifReport-{name}.zip"),
            bytes,
        })
    }

    fn persist(&self, registry: &SessionRegistry, operation: &str, name: &str) -> Result<()> {
        self.store.write_registry(registry).map_err(|e| {
            tracing::error!(
                operation,
                session_name = %name,
                error = %e,
                "Failed to write session registry"
            );
            e
        })
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SessionError::EmptyName);
    }
    Ok(())
}

impl Clone for SessionManager {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            surfaces: self.surfaces.clone(),
            registry_lock: Arc::clone(&self.registry_lock),
            confirmation: Arc::clone(&self.confirmation),
            events: self.events.clone(),
        }
    }
}
