//! Chef Inventory
//!
//! Access to the Chef server on behalf of authenticating nodes.
//!
//! ## Architecture
//!
//! The [`InventoryClient`] trait has two operations:
//!
//! - **authenticate_node**: fetch the node object signed with the node's key,
//!   proving the caller holds it
//! - **execute_search**: run a node search and collect every result row
//!
//! [`ChefClient`] implements it over HTTPS with Chef's signed-header
//! protocol (see [`signing`]). [`MockInventory`] is an in-memory stand-in
//! for tests.
//!
//! ## Usage
//!
//! ```ignore
//! use chefauth_inventory::{ChefClient, ChefClientConfig, InventoryClient, NodeCredentials};
//!
//! let client = ChefClient::new(ChefClientConfig::default())?;
//! let creds = NodeCredentials::new("https://chef.example.com/organizations/acme", "web-01", pem);
//! let node = client.authenticate_node(&creds).await?;
//! println!("Policy: {:?}", node.policy_name);
//! ```

pub mod client;
pub mod clients;
pub mod error;
pub mod signing;
pub mod types;

pub use client::InventoryClient;
pub use clients::{ChefClient, ChefClientConfig, MockInventory};
pub use error::{InventoryError, Result};
pub use signing::RequestSigner;
pub use types::{NodeCredentials, SearchResponse};
