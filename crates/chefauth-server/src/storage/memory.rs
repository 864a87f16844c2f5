//! In-memory storage backend
//!
//! Default storage implementation using an ordered map.
//! Suitable for development and single-instance deployments.
//! Data is lost on restart.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;
use tracing::debug;

use super::{ConfigStore, StorageError};

/// In-memory config store implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    /// Create a new in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail, simulating a backend outage
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StorageError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("memory store offline".into()));
        }
        Ok(())
    }
}

fn poisoned<T>(_: T) -> StorageError {
    StorageError::Backend("lock poisoned".into())
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check_available()?;
        let entries = self.entries.read().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        debug!(key = %key, bytes = value.len(), "Storing entry");
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        self.check_available()?;
        let entries = self.entries.read().map_err(poisoned)?;

        let names: BTreeSet<String> = entries
            .range(prefix.to_string()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
            .filter_map(|key| {
                let rest = &key[prefix.len()..];
                match rest.find('/') {
                    _ if rest.is_empty() => None,
                    Some(i) => Some(rest[..=i].to_string()),
                    None => Some(rest.to_string()),
                }
            })
            .collect();

        Ok(names.into_iter().collect())
    }

    async fn delete(&self, key: &str) -> Result<bool, StorageError> {
        self.check_available()?;
        let mut entries = self.entries.write().map_err(poisoned)?;
        let removed = entries.remove(key).is_some();
        if removed {
            debug!(key = %key, "Deleted entry");
        }
        Ok(removed)
    }
}
