use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StoreError;

/// Key-value persistence port shared by every typed store.
///
/// Implementations must make `set` durable before returning.
pub trait KeyValueStore: Send + Sync {
    /// Reads the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes `key`. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend, used by tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned { context: "memory get" })?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned { context: "memory set" })?;
        entries.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_poisoned| StoreError::Poisoned {
                context: "memory remove",
            })?;
        entries.remove(key);
        Ok(())
    }
}

/// Reads and decodes a JSON value. A corrupted value is logged and treated as
/// absent so callers fail open to the type's default.
pub(super) fn read_json_or_default<T>(
    kv: &dyn KeyValueStore,
    key: &'static str,
) -> Result<T, StoreError>
where
    T: serde::de::DeserializeOwned + Default,
{
    let Some(raw) = kv.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(err) => {
            tracing::warn!("Discarding unreadable '{}' state: {}", key, err);
            Ok(T::default())
        }
    }
}

pub(super) fn write_json<T>(
    kv: &dyn KeyValueStore,
    key: &'static str,
    value: &T,
) -> Result<(), StoreError>
where
    T: serde::Serialize + ?Sized,
{
    let raw = serde_json::to_string(value)
        .map_err(|err| StoreError::Serialize { key, source: err })?;
    kv.set(key, &raw)
}
