//! Rule registries
//!
//! Keyed CRUD over Chef policies, roles and saved searches, plus the
//! backend configuration, all persisted as JSON in a [`ConfigStore`].
//!
//! A single coarse lock guards the registries: writers take it exclusively,
//! readers share it. Guards are never held across inventory calls; callers
//! load what they need, drop the guard, then talk to the Chef server.

pub mod policies;
pub mod roles;
pub mod searches;

pub use policies::PolicyPatch;
pub use roles::RolePatch;
pub use searches::SearchPatch;

use chefauth_core::{storage_key, BackendConfig, ChefAuthError, Result};
use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{info, warn};

use crate::storage::{get_json, put_json, ConfigStore};

/// Storage key of the backend configuration
pub const CONFIG_KEY: &str = "config";

/// A rule record stored under a name
pub trait Record: Serialize + DeserializeOwned + Send + Sync + Sized {
    /// Storage prefix of this kind of record
    const PREFIX: &'static str;

    /// Human-readable kind, used in error messages
    const KIND: &'static str;

    /// Partial update accepted by writes
    type Patch: Send;

    /// Name of the record
    fn name(&self) -> &str;

    /// Build a new record from a patch, validating it
    fn create(name: &str, patch: Self::Patch) -> Result<Self>;

    /// Apply a patch over a stored record, validating the result
    fn update(self, patch: Self::Patch) -> Result<Self>;

    /// Storage key of the record with this name
    fn key(name: &str) -> String {
        format!("{}{}", Self::PREFIX, storage_key(name))
    }
}

/// How a write treats an existing record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Fail if the record exists
    Create,
    /// Fail if the record does not exist
    Update,
    /// Create or update, decided by an existence check
    Upsert,
}

/// Policy, role and search registries over one store
#[derive(Debug)]
pub struct Registry {
    store: Arc<dyn ConfigStore>,
    lock: RwLock<()>,
}

impl Registry {
    /// Create registries backed by `store`
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            lock: RwLock::new(()),
        }
    }

    /// Take the shared lock for lookups
    pub async fn read(&self) -> RegistryReader<'_> {
        RegistryReader {
            _guard: self.lock.read().await,
            store: self.store.as_ref(),
        }
    }

    /// Take the exclusive lock for mutations
    pub async fn write(&self) -> RegistryWriter<'_> {
        RegistryWriter {
            _guard: self.lock.write().await,
            store: self.store.as_ref(),
        }
    }

    /// Create or update a record with a partial patch
    ///
    /// The existence check and the write happen under one exclusive lock.
    /// Returns the stored record and whether it was newly created.
    pub async fn write_record<R: Record>(
        &self,
        name: &str,
        patch: R::Patch,
        mode: WriteMode,
    ) -> Result<(R, bool)> {
        if name.trim().is_empty() {
            return Err(ChefAuthError::Validation(format!("{} name is empty", R::KIND)));
        }

        let writer = self.write().await;
        let existing = writer.get::<R>(name).await?;

        let (record, created) = match (existing, mode) {
            (Some(_), WriteMode::Create) => {
                return Err(ChefAuthError::AlreadyExists {
                    kind: R::KIND,
                    name: name.to_string(),
                })
            }
            (None, WriteMode::Update) => {
                return Err(ChefAuthError::NotFound {
                    kind: R::KIND,
                    name: name.to_string(),
                })
            }
            (Some(current), _) => (current.update(patch)?, false),
            (None, _) => (R::create(name, patch)?, true),
        };

        writer.put(&record).await?;
        info!(kind = R::KIND, name = %record.name(), created, "Stored record");
        Ok((record, created))
    }

    /// Delete a record, returning whether it existed
    pub async fn delete_record<R: Record>(&self, name: &str) -> Result<bool> {
        let writer = self.write().await;
        let removed = writer.delete::<R>(name).await?;
        if removed {
            info!(kind = R::KIND, name = %name, "Deleted record");
        }
        Ok(removed)
    }

    /// Read one record
    pub async fn get_record<R: Record>(&self, name: &str) -> Result<Option<R>> {
        self.read().await.get::<R>(name).await
    }

    /// List record names of one kind
    pub async fn list_records<R: Record>(&self) -> Result<Vec<String>> {
        self.read().await.list::<R>().await
    }

    /// Current backend configuration
    pub async fn config(&self) -> Result<Option<BackendConfig>> {
        self.read().await.config().await
    }

    /// Replace the backend configuration after validating it
    pub async fn set_config(&self, config: BackendConfig) -> Result<BackendConfig> {
        let config = config.validate()?;
        let writer = self.write().await;
        put_json(writer.store, CONFIG_KEY, &config).await?;
        info!(host = %config.host, defaults = ?config.default_policies, "Stored backend configuration");
        Ok(config)
    }
}

/// Shared access to the registries
pub struct RegistryReader<'a> {
    _guard: RwLockReadGuard<'a, ()>,
    store: &'a dyn ConfigStore,
}

impl RegistryReader<'_> {
    /// Read one record by name
    pub async fn get<R: Record>(&self, name: &str) -> Result<Option<R>> {
        get_json(self.store, &R::key(name)).await
    }

    /// List record names of one kind
    pub async fn list<R: Record>(&self) -> Result<Vec<String>> {
        Ok(self.store.list(R::PREFIX).await?)
    }

    /// Load every record of one kind
    ///
    /// A name listed but gone by the time it is read is skipped.
    pub async fn load_all<R: Record>(&self) -> Result<Vec<R>> {
        let mut records = Vec::new();
        for name in self.list::<R>().await? {
            match self.get::<R>(&name).await? {
                Some(record) => records.push(record),
                None => warn!(kind = R::KIND, name = %name, "Listed record disappeared"),
            }
        }
        Ok(records)
    }

    /// Current backend configuration
    pub async fn config(&self) -> Result<Option<BackendConfig>> {
        get_json(self.store, CONFIG_KEY).await
    }
}

/// Exclusive access to the registries
pub struct RegistryWriter<'a> {
    _guard: RwLockWriteGuard<'a, ()>,
    store: &'a dyn ConfigStore,
}

impl RegistryWriter<'_> {
    /// Read one record by name
    pub async fn get<R: Record>(&self, name: &str) -> Result<Option<R>> {
        get_json(self.store, &R::key(name)).await
    }

    /// Store a record under its name
    pub async fn put<R: Record>(&self, record: &R) -> Result<()> {
        put_json(self.store, &R::key(record.name()), record).await
    }

    /// Delete a record by name
    pub async fn delete<R: Record>(&self, name: &str) -> Result<bool> {
        Ok(self.store.delete(&R::key(name)).await?)
    }
}

/// Seconds from a patch, as a `Duration`
pub(crate) fn secs(value: Option<u64>) -> Option<std::time::Duration> {
    value.map(std::time::Duration::from_secs)
}

/// Duration field of a patch: whole seconds, or a string such as `"90"`,
/// `"30s"` or `"1h 30m"`
pub(crate) fn duration_field<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Input {
        Seconds(u64),
        Text(String),
    }

    match Option::<Input>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Input::Seconds(secs)) => Ok(Some(secs)),
        Some(Input::Text(text)) => {
            let text = text.trim();
            if let Ok(secs) = text.parse::<u64>() {
                return Ok(Some(secs));
            }
            humantime::parse_duration(text)
                .map(|d| Some(d.as_secs()))
                .map_err(|e| de::Error::custom(format!("invalid duration {:?}: {}", text, e)))
        }
    }
}
