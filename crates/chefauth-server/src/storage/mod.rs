//! Storage abstraction for rule and configuration records
//!
//! Records are opaque bytes under string keys; the registries above this
//! layer encode them as JSON. Only an in-memory backend ships here, any
//! durable key/value store can implement [`ConfigStore`].

pub mod memory;

pub use memory::MemoryStore;

use async_trait::async_trait;
use chefauth_core::ChefAuthError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Error type for storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<StorageError> for ChefAuthError {
    fn from(err: StorageError) -> Self {
        ChefAuthError::Storage(err.to_string())
    }
}

/// Key/value storage backend
///
/// Implementations must be thread-safe and support concurrent access.
#[async_trait]
pub trait ConfigStore: Send + Sync + Debug {
    /// Get the value stored at `key`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` at `key`, replacing any previous value
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// List the entries directly under `prefix`
    ///
    /// Names are returned relative to the prefix. Entries nested deeper are
    /// folded into their first path segment, suffixed with `/`.
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Delete the value at `key`, returning whether it existed
    async fn delete(&self, key: &str) -> Result<bool, StorageError>;
}

/// Read and decode a JSON record
pub async fn get_json<T: DeserializeOwned + Send>(
    store: &dyn ConfigStore,
    key: &str,
) -> chefauth_core::Result<Option<T>> {
    match store.get(key).await? {
        Some(bytes) => serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| ChefAuthError::decode(key, e)),
        None => Ok(None),
    }
}

/// Encode and write a JSON record
pub async fn put_json<T: Serialize + Sync>(
    store: &dyn ConfigStore,
    key: &str,
    value: &T,
) -> chefauth_core::Result<()> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.put(key, bytes).await?;
    Ok(())
}
