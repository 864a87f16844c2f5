//! Core types for inventory access

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Credentials a node presents at login
///
/// The private key is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct NodeCredentials {
    /// Base URL of the Chef server (organization URL included)
    pub base_url: String,

    /// Node (client) name
    pub node_name: String,

    /// PEM-encoded RSA private key of the node's client
    pub private_key: String,
}

impl NodeCredentials {
    /// Create new node credentials
    pub fn new(
        base_url: impl Into<String>,
        node_name: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            node_name: node_name.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for NodeCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeCredentials")
            .field("base_url", &self.base_url)
            .field("node_name", &self.node_name)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// One page of a Chef search response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    /// Total number of matching rows across all pages
    #[serde(default)]
    pub total: u64,

    /// Offset of this page
    #[serde(default)]
    pub start: u64,

    /// Rows of this page
    #[serde(default)]
    pub rows: Vec<Value>,
}
