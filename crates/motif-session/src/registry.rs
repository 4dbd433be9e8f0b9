//! Session registry: every saved session, keyed by name

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::bundle::SessionBundle;

/// Written every autosave cycle and on debounced edits
pub const AUTO_SAVE: &str = "Auto Save";
/// Written on the long autosave cycle
pub const BACKUP_SAVE: &str = "Backup Save";
pub const RESERVED_NAMES: [&str; 2] = [AUTO_SAVE, BACKUP_SAVE];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.contains(&name)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRegistry {
    sessions: BTreeMap<String, SessionBundle>,
}

/// One line of the save/load pickers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub name: String,
    pub timestamp: DateTime<Utc>,
    pub reserved: bool,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a stored blob, keeping every entry that is a valid bundle.
    ///
    /// Returns `None` when the blob is not a JSON object at all.
    pub fn parse_lenient(json: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        let entries = match value {
            serde_json::Value::Object(entries) => entries,
            _ => return None,
        };

        let sessions = entries
            .into_iter()
            .filter_map(
                |(name, entry)| match serde_json::from_value::<SessionBundle>(entry) {
                    Ok(bundle) => Some((name, bundle)),
                    Err(e) => {
                        tracing::warn!(session_name = %name, error = %e, "Skipping unreadable session entry");
                        None
                    }
                },
            )
            .collect();

        Some(Self { sessions })
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn get(&self, name: &str) -> Option<&SessionBundle> {
        self.sessions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sessions.contains_key(name)
    }

    /// Insert or overwrite; returns the replaced bundle.
    pub fn insert(&mut self, name: impl Into<String>, bundle: SessionBundle) -> Option<SessionBundle> {
        self.sessions.insert(name.into(), bundle)
    }

    pub fn remove(&mut self, name: &str) -> Option<SessionBundle> {
        self.sessions.remove(name)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sessions.keys().map(String::as_str)
    }

    /// Reserved entries first (Auto Save, Backup Save), then user saves,
    /// newest first.
    pub fn summaries(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> = RESERVED_NAMES
            .iter()
            .filter_map(|name| {
                self.sessions.get(*name).map(|bundle| SessionSummary {
                    name: name.to_string(),
                    timestamp: bundle.timestamp,
                    reserved: true,
                })
            })
            .collect();

        let mut user: Vec<SessionSummary> = self
            .sessions
            .iter()
            .filter(|(name, _)| !is_reserved(name))
            .map(|(name, bundle)| SessionSummary {
                name: name.clone(),
                timestamp: bundle.timestamp,
                reserved: false,
            })
            .collect();
        user.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        summaries.extend(user);
        summaries
    }
}
