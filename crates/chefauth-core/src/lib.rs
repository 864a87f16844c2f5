//! # Chefauth Core
//!
//! Domain types for authenticating Chef nodes and deciding what they may
//! access.
//!
//! ## Key Concepts
//!
//! - **Node**: a managed host known to the Chef server, parsed into a [`NodeRecord`]
//! - **Rules**: administrator-defined [`ChefPolicy`], [`Role`] and [`ChefSearch`] records
//! - **Lease**: the TTL, max TTL and period granted by the matching rule
//! - **Decision**: the merged policy set and lease returned on login or renewal
//!
//! ## Matching Invariants
//!
//! 1. A node with a Chef policy name is matched only by that name
//! 2. A node without one is matched by its run-list roles
//! 3. Every successful login carries the `"default"` policy

pub mod config;
pub mod decision;
pub mod error;
pub mod lease;
pub mod rules;
pub mod types;

pub use config::BackendConfig;
pub use decision::{
    AuthDecision, AuthDecisionBuilder, GroupAlias, LeaseState, MatchedRule, RuleMatch,
    DEFAULT_POLICY,
};
pub use error::{ChefAuthError, Result};
pub use lease::LeaseParams;
pub use rules::{storage_key, ChefPolicy, ChefSearch, Role, MAX_ALLOWED_STALENESS};
pub use types::{search_membership, NodeRecord};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the library version
pub fn version() -> &'static str {
    VERSION
}
