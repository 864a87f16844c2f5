//! Mock Inventory
//!
//! For testing purposes - an in-memory Chef server with registered nodes
//! and canned search results.

use async_trait::async_trait;
use chefauth_core::NodeRecord;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::client::InventoryClient;
use crate::error::{InventoryError, Result};
use crate::types::NodeCredentials;

/// In-memory inventory for tests
///
/// Nodes authenticate when the presented key equals the registered one.
/// Searches answer with rows set per query; unknown queries return no rows.
#[derive(Default)]
pub struct MockInventory {
    nodes: RwLock<HashMap<String, (String, NodeRecord)>>,
    searches: RwLock<HashMap<String, Vec<Value>>>,
    failing_searches: RwLock<HashSet<String>>,
    search_calls: RwLock<HashMap<String, usize>>,
    total_search_calls: AtomicUsize,
}

impl MockInventory {
    /// Create an empty mock inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a node and the key it authenticates with
    pub fn register_node(&self, node: NodeRecord, private_key: impl Into<String>) {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.insert(node.name.clone(), (private_key.into(), node));
    }

    /// Remove a node; later authentications for it are denied
    pub fn remove_node(&self, name: &str) -> bool {
        let mut nodes = self.nodes.write().unwrap_or_else(PoisonError::into_inner);
        nodes.remove(name).is_some()
    }

    /// Set the rows returned for a query
    pub fn set_search_rows(&self, query: impl Into<String>, rows: Vec<Value>) {
        let mut searches = self.searches.write().unwrap_or_else(PoisonError::into_inner);
        searches.insert(query.into(), rows);
    }

    /// Set the rows for a query to one `{"name": ...}` object per node name
    pub fn set_search_nodes(&self, query: impl Into<String>, names: &[&str]) {
        let rows = names
            .iter()
            .map(|name| serde_json::json!({ "name": name }))
            .collect();
        self.set_search_rows(query, rows);
    }

    /// Make a query fail with a transport error
    pub fn fail_search(&self, query: impl Into<String>) {
        let mut failing = self
            .failing_searches
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        failing.insert(query.into());
    }

    /// Number of times a query was executed
    pub fn search_calls(&self, query: &str) -> usize {
        let calls = self.search_calls.read().unwrap_or_else(PoisonError::into_inner);
        calls.get(query).copied().unwrap_or(0)
    }

    /// Number of searches executed across all queries
    pub fn total_search_calls(&self) -> usize {
        self.total_search_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryClient for MockInventory {
    fn description(&self) -> &str {
        "mock inventory"
    }

    async fn authenticate_node(&self, credentials: &NodeCredentials) -> Result<NodeRecord> {
        let nodes = self.nodes.read().unwrap_or_else(PoisonError::into_inner);
        match nodes.get(&credentials.node_name) {
            Some((key, node)) if *key == credentials.private_key => {
                let mut node = node.clone();
                node.host = credentials.base_url.clone();
                Ok(node)
            }
            Some(_) => Err(InventoryError::Denied(format!(
                "signature mismatch for node {}",
                credentials.node_name
            ))),
            None => Err(InventoryError::Denied(format!(
                "node {} not found",
                credentials.node_name
            ))),
        }
    }

    async fn execute_search(&self, _credentials: &NodeCredentials, query: &str) -> Result<Vec<Value>> {
        self.total_search_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut calls = self.search_calls.write().unwrap_or_else(PoisonError::into_inner);
            *calls.entry(query.to_string()).or_insert(0) += 1;
        }

        let failing = self
            .failing_searches
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        if failing.contains(query) {
            return Err(InventoryError::Http(format!("search {} failed", query)));
        }

        let searches = self.searches.read().unwrap_or_else(PoisonError::into_inner);
        Ok(searches.get(query).cloned().unwrap_or_default())
    }
}
