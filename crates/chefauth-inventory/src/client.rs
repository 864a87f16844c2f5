//! Inventory client trait

use async_trait::async_trait;
use chefauth_core::NodeRecord;
use serde_json::Value;

use crate::error::Result;
use crate::types::NodeCredentials;

/// Access to the Chef server on behalf of an authenticating node
///
/// Every call is made with the node's own credentials, so a successful
/// [`authenticate_node`](InventoryClient::authenticate_node) proves the
/// caller holds the node's private key.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Fetch the node object, authenticating with the node's key
    ///
    /// # Returns
    /// * `Ok(NodeRecord)` - The node as recorded by the Chef server
    /// * `Err(InventoryError::Denied)` - If the server rejects the credentials
    async fn authenticate_node(&self, credentials: &NodeCredentials) -> Result<NodeRecord>;

    /// Run a node search and return every row across all pages
    async fn execute_search(&self, credentials: &NodeCredentials, query: &str) -> Result<Vec<Value>>;

    /// Get a description of this client (for logging)
    fn description(&self) -> &str {
        "inventory client"
    }
}
