//! Persistence of the configuration record

use super::entry::ConfigEntry;
use crate::{Error, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, RwLock};

/// Key the single record lives under
const CONFIG_KEY: &str = "config";

/// Key/value storage supplied by the host.
///
/// A `put` replaces the value atomically; readers never observe a partial
/// record.
pub trait Storage: Send + Sync {
    /// Fetch the value under `key`, `None` if nothing was ever stored
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send;

    /// Replace the value under `key`
    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send;
}

impl<T: Storage> Storage for Arc<T> {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        (**self).put(key, value)
    }
}

/// In-process storage
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Empty storage
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> Error {
        Error::Storage("memory storage lock poisoned".into())
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<Vec<u8>>>> + Send {
        let value = self
            .entries
            .read()
            .map(|entries| entries.get(key).cloned())
            .map_err(|_| Self::poisoned());
        async move { value }
    }

    fn put(&self, key: &str, value: Vec<u8>) -> impl Future<Output = Result<()>> + Send {
        let result = self
            .entries
            .write()
            .map(|mut entries| {
                entries.insert(key.to_string(), value);
            })
            .map_err(|_| Self::poisoned());
        async move { result }
    }
}

/// Repository for the single configuration record
#[derive(Debug, Clone)]
pub struct ConfigStore<S> {
    storage: S,
}

impl<S: Storage> ConfigStore<S> {
    /// Wrap a storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Load the record, `None` when no write has ever succeeded.
    ///
    /// Defaults are applied first and stored fields overwrite them.
    pub async fn load(&self) -> Result<Option<ConfigEntry>> {
        let Some(raw) = self.storage.get(CONFIG_KEY).await? else {
            return Ok(None);
        };
        let entry = serde_json::from_slice(&raw)?;
        Ok(Some(entry))
    }

    /// Replace the record
    pub async fn save(&self, entry: &ConfigEntry) -> Result<()> {
        let raw = serde_json::to_vec(entry)?;
        self.storage.put(CONFIG_KEY, raw).await
    }
}
