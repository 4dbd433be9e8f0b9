//! Registry persistence on top of the page's key-value store

use std::sync::Arc;

use motif_storage::KeyValueStore;

use crate::bundle::{NotebookContent, SessionBundle};
use crate::registry::{SessionRegistry, AUTO_SAVE};
use crate::surface::Surface;
use crate::Result;

/// Key holding the whole session registry
pub const REGISTRY_KEY: &str = "motif-sessions";
/// Older single-slot content blob, fields named `rolls`, `character`, ...
pub const LEGACY_CONTENT_KEY: &str = "motifOracle";
/// Older single-slot autosave, fields named by editor id
pub const LEGACY_AUTO_SAVE_KEY: &str = "motif-oracle-auto-save";

pub struct RegistryStore {
    kv: Arc<dyn KeyValueStore>,
}

impl RegistryStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Read the registry. Absent or unreadable blobs yield an empty registry.
    pub fn read_registry(&self) -> SessionRegistry {
        let blob = match self.kv.get_item(REGISTRY_KEY) {
            Ok(Some(blob)) => blob,
            Ok(None) => return SessionRegistry::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Session storage unavailable, using empty registry");
                return SessionRegistry::new();
            }
        };

        SessionRegistry::parse_lenient(&blob).unwrap_or_else(|| {
            tracing::warn!("Session registry is corrupt, using empty registry");
            SessionRegistry::new()
        })
    }

    /// Replace the stored registry with `registry`.
    pub fn write_registry(&self, registry: &SessionRegistry) -> Result<()> {
        let json = registry.to_json()?;
        self.kv.set_item(REGISTRY_KEY, &json)?;

        tracing::debug!(sessions = registry.len(), bytes = json.len(), "Wrote session registry");
        Ok(())
    }

    /// Fold the single-slot saves of older releases into "Auto Save".
    ///
    /// Legacy content is only adopted when no "Auto Save" exists yet; the
    /// legacy keys are removed either way. Returns whether an entry was added.
    pub fn migrate_legacy(&self) -> Result<bool> {
        let legacy = self
            .read_legacy(LEGACY_CONTENT_KEY, Surface::legacy_field)
            .filter(|c| !c.is_blank())
            .or_else(|| {
                self.read_legacy(LEGACY_AUTO_SAVE_KEY, Surface::editor_id)
                    .filter(|c| !c.is_blank())
            });

        let mut migrated = false;
        if let Some(content) = legacy {
            let mut registry = self.read_registry();
            if !registry.contains(AUTO_SAVE) {
                registry.insert(AUTO_SAVE, SessionBundle::new(content));
                self.write_registry(&registry)?;
                migrated = true;
                tracing::info!("Migrated legacy notebook content into Auto Save");
            }
        }

        self.kv.remove_item(LEGACY_CONTENT_KEY)?;
        self.kv.remove_item(LEGACY_AUTO_SAVE_KEY)?;

        Ok(migrated)
    }

    fn read_legacy(&self, key: &str, field: fn(&Surface) -> &'static str) -> Option<NotebookContent> {
        let blob = self.kv.get_item(key).ok().flatten()?;
        let value: serde_json::Value = match serde_json::from_str(&blob) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Ignoring unreadable legacy content");
                return None;
            }
        };

        let mut content = NotebookContent::default();
        for surface in Surface::ALL {
            if let Some(markup) = value.get(field(&surface)).and_then(|v| v.as_str()) {
                content.set(surface, markup);
            }
        }
        Some(content)
    }
}

impl Clone for RegistryStore {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_storage::{Database, MemoryStore, StorageError};

    fn memory_store() -> (MemoryStore, RegistryStore) {
        let kv = MemoryStore::new();
        let store = RegistryStore::new(Arc::new(kv.clone()));
        (kv, store)
    }

    #[test]
    fn test_read_absent_or_corrupt_registry_is_empty() {
        let (kv, store) = memory_store();
        assert!(store.read_registry().is_empty());

        kv.set_item(REGISTRY_KEY, "{{{").unwrap();
        assert!(store.read_registry().is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let db = Database::open_in_memory().unwrap();
        let store = RegistryStore::new(Arc::new(db));

        let mut registry = SessionRegistry::new();
        let mut content = NotebookContent::default();
        content.set(Surface::Oracle, "<p>Roll: 4,2,6</p>");
        registry.insert("Chapter 1", SessionBundle::new(content));
        store.write_registry(&registry).unwrap();

        assert_eq!(store.read_registry(), registry);
    }

    #[test]
    fn test_write_failure_leaves_stored_registry() {
        let kv = MemoryStore::with_quota(256);
        let store = RegistryStore::new(Arc::new(kv));

        let mut registry = SessionRegistry::new();
        registry.insert("small", SessionBundle::new(NotebookContent::default()));
        store.write_registry(&registry).unwrap();

        let mut big = registry.clone();
        let mut content = NotebookContent::default();
        content.set(Surface::Story, "x".repeat(1024));
        big.insert("big", SessionBundle::new(content));

        let err = store.write_registry(&big).unwrap_err();
        assert!(matches!(
            err,
            crate::SessionError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.read_registry(), registry);
    }

    #[test]
    fn test_migrate_legacy_content() {
        let (kv, store) = memory_store();
        kv.set_item(
            LEGACY_CONTENT_KEY,
            r#"{"rolls":"<p>6,6,6</p>","character":"<p>Wren</p>","scene":"","story":"","extra":""}"#,
        )
        .unwrap();
        kv.set_item(LEGACY_AUTO_SAVE_KEY, r#"{"rolls-editor":"<p>old</p>"}"#)
            .unwrap();

        assert!(store.migrate_legacy().unwrap());

        let registry = store.read_registry();
        let auto = registry.get(AUTO_SAVE).unwrap();
        assert_eq!(auto.content.oracle, "<p>6,6,6</p>");
        assert_eq!(auto.content.character, "<p>Wren</p>");
        assert_eq!(kv.get_item(LEGACY_CONTENT_KEY).unwrap(), None);
        assert_eq!(kv.get_item(LEGACY_AUTO_SAVE_KEY).unwrap(), None);

        // Second run finds nothing to do
        assert!(!store.migrate_legacy().unwrap());
    }

    #[test]
    fn test_migrate_legacy_falls_back_past_blank_content() {
        let (kv, store) = memory_store();
        kv.set_item(
            LEGACY_CONTENT_KEY,
            r#"{"rolls":"","character":"  ","scene":"","story":"","extra":""}"#,
        )
        .unwrap();
        kv.set_item(LEGACY_AUTO_SAVE_KEY, r#"{"story-editor":"<p>only copy</p>"}"#)
            .unwrap();

        assert!(store.migrate_legacy().unwrap());
        assert_eq!(
            store.read_registry().get(AUTO_SAVE).unwrap().content.story,
            "<p>only copy</p>"
        );
        assert_eq!(kv.get_item(LEGACY_CONTENT_KEY).unwrap(), None);
        assert_eq!(kv.get_item(LEGACY_AUTO_SAVE_KEY).unwrap(), None);
    }

    #[test]
    fn test_migrate_legacy_keeps_existing_auto_save() {
        let (kv, store) = memory_store();
        let mut registry = SessionRegistry::new();
        let mut content = NotebookContent::default();
        content.set(Surface::Scene, "<p>current</p>");
        registry.insert(AUTO_SAVE, SessionBundle::new(content));
        store.write_registry(&registry).unwrap();

        kv.set_item(LEGACY_AUTO_SAVE_KEY, r#"{"scene-editor":"<p>stale</p>"}"#)
            .unwrap();

        assert!(!store.migrate_legacy().unwrap());
        assert_eq!(
            store.read_registry().get(AUTO_SAVE).unwrap().content.scene,
            "<p>current</p>"
        );
        assert_eq!(kv.get_item(LEGACY_AUTO_SAVE_KEY).unwrap(), None);
    }
}
