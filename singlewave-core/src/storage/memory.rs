//! In-memory implementation of [`KeyValueStore`].
//!
//! Nothing survives the process. Useful for tests and for hosts that opt out
//! of persistence entirely; sharing one `Arc<MemoryStore>` between two SDK
//! handles simulates an app restart.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use super::{KeyValueStore, StoreResult};

/// In-memory key-value store backed by a `HashMap`.
#[derive(Debug, Default, uniffi::Object)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

#[uniffi::export]
impl MemoryStore {
    /// Creates an empty store.
    #[uniffi::constructor]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len() as u64
    }

    /// Whether the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, value);
        Ok(())
    }

    fn remove(&self, key: String) -> StoreResult<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&key);
        Ok(())
    }
}
