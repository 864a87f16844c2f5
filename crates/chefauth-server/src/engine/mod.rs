//! Authentication engine
//!
//! [`AuthBackend`] ties the registries, the inventory client and the search
//! cache together. Login resolution lives in [`resolve`], renewal in
//! [`renew`]; this module holds the administrative operations that must
//! keep the cache consistent with the search registry.

pub mod cache;
pub mod renew;
pub mod resolve;

pub use cache::{SearchCache, SearchMatches};

use chefauth_core::{BackendConfig, ChefPolicy, ChefSearch, Result, Role};
use chefauth_inventory::InventoryClient;
use std::sync::Arc;
use tracing::info;

use crate::registry::{
    PolicyPatch, Record, Registry, RolePatch, SearchPatch, WriteMode,
};
use crate::storage::ConfigStore;

/// The Chef authentication backend
pub struct AuthBackend {
    registry: Registry,
    inventory: Arc<dyn InventoryClient>,
    cache: SearchCache,
}

impl AuthBackend {
    /// Create a backend over a store and an inventory client
    pub fn new(store: Arc<dyn ConfigStore>, inventory: Arc<dyn InventoryClient>) -> Self {
        info!(inventory = inventory.description(), "Initializing auth backend");
        Self {
            registry: Registry::new(store),
            inventory,
            cache: SearchCache::new(),
        }
    }

    /// Rule registries
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Search membership cache
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    // =========================================================================
    // Configuration
    // =========================================================================

    /// Current backend configuration
    pub async fn config(&self) -> Result<Option<BackendConfig>> {
        self.registry.config().await
    }

    /// Replace the backend configuration
    ///
    /// Cached search results were computed against the previous Chef
    /// server, so they are dropped.
    pub async fn set_config(&self, config: BackendConfig) -> Result<BackendConfig> {
        let config = self.registry.set_config(config).await?;
        self.cache.flush();
        Ok(config)
    }

    // =========================================================================
    // Rules
    // =========================================================================

    /// Create or update a Chef policy
    pub async fn write_policy(&self, name: &str, patch: PolicyPatch, mode: WriteMode) -> Result<(ChefPolicy, bool)> {
        self.registry.write_record(name, patch, mode).await
    }

    /// Create or update a role
    pub async fn write_role(&self, name: &str, patch: RolePatch, mode: WriteMode) -> Result<(Role, bool)> {
        self.registry.write_record(name, patch, mode).await
    }

    /// Create or update a saved search, dropping its cached result
    pub async fn write_search(&self, name: &str, patch: SearchPatch, mode: WriteMode) -> Result<(ChefSearch, bool)> {
        let written = self.registry.write_record::<ChefSearch>(name, patch, mode).await?;
        self.cache.invalidate(name);
        Ok(written)
    }

    /// Read one record
    pub async fn get<R: Record>(&self, name: &str) -> Result<Option<R>> {
        self.registry.get_record::<R>(name).await
    }

    /// List record names of one kind
    pub async fn list<R: Record>(&self) -> Result<Vec<String>> {
        self.registry.list_records::<R>().await
    }

    /// Delete a Chef policy
    pub async fn delete_policy(&self, name: &str) -> Result<bool> {
        self.registry.delete_record::<ChefPolicy>(name).await
    }

    /// Delete a role
    pub async fn delete_role(&self, name: &str) -> Result<bool> {
        self.registry.delete_record::<Role>(name).await
    }

    /// Delete a saved search and its cached result
    pub async fn delete_search(&self, name: &str) -> Result<bool> {
        let removed = self.registry.delete_record::<ChefSearch>(name).await?;
        self.cache.invalidate(name);
        Ok(removed)
    }

    /// Drop every cached search result
    pub fn refresh_searches(&self) -> usize {
        let flushed = self.cache.flush();
        info!(flushed, "Flushed search cache");
        flushed
    }
}
