//! Key-value store abstraction shared by all backends

use crate::error::StorageError;
use crate::Result;

/// A string-to-string store with whole-value replacement semantics.
///
/// Implementations must make `set_item` atomic from the caller's point of
/// view: after a failed write the previous value (if any) is still readable.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Vec<String>>;
}

/// Byte budget across all entries, counted as key length plus value length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    pub limit: usize,
}

impl Quota {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    /// Check that replacing `key` with `value` keeps usage within the limit.
    ///
    /// `current_total` is the usage of the whole store and `current_entry`
    /// the usage of the existing entry under `key` (0 if absent).
    pub fn check(
        &self,
        current_total: usize,
        current_entry: usize,
        key: &str,
        value: &str,
    ) -> Result<()> {
        let required = current_total.saturating_sub(current_entry) + entry_size(key, value);
        if required > self.limit {
            tracing::warn!(key = %key, required, limit = self.limit, "Storage quota exceeded");
            return Err(StorageError::QuotaExceeded {
                required,
                limit: self.limit,
            });
        }
        Ok(())
    }
}

pub(crate) fn entry_size(key: &str, value: &str) -> usize {
    key.len() + value.len()
}
