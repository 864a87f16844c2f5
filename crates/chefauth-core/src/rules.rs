//! Administrator-defined matching rules
//!
//! Three kinds of rule map Chef nodes to policies:
//! - [`ChefPolicy`]: matched 1:1 against a node's policy name
//! - [`Role`]: matched by policy name or by intersecting the node's run-list roles
//! - [`ChefSearch`]: a saved search whose matching nodes gain extra policies

use crate::error::{ChefAuthError, Result};
use crate::lease::{duration_secs, LeaseParams};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest time saved search results may be reused
pub const MAX_ALLOWED_STALENESS: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Normalize a rule name into its case-insensitive storage key
pub fn storage_key(name: &str) -> String {
    name.to_lowercase()
}

/// Chef names are compared ignoring case, like rule names
fn same_name(a: &str, b: &str) -> bool {
    a == b || storage_key(a) == storage_key(b)
}

fn require_name(kind: &str, name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ChefAuthError::Validation(format!("{} name is empty", kind)));
    }
    Ok(())
}

/// A Chef policy name mapped to a set of policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefPolicy {
    /// Chef policy name, as set on the node
    pub name: String,

    /// Policies granted to matching nodes
    #[serde(default)]
    pub policies: Vec<String>,

    /// Lease granted to matching nodes
    #[serde(flatten)]
    pub lease: LeaseParams,
}

impl ChefPolicy {
    /// Create a new Chef policy rule
    pub fn new(name: impl Into<String>, lease: LeaseParams) -> Self {
        Self {
            name: name.into(),
            policies: Vec::new(),
            lease,
        }
    }

    /// Set the granted policies
    pub fn with_policies(mut self, policies: Vec<String>) -> Self {
        self.policies = policies;
        self
    }

    /// Validate the rule and normalize its lease
    pub fn validate(mut self) -> Result<Self> {
        require_name("policy", &self.name)?;
        self.lease = self.lease.normalize()?;
        Ok(self)
    }
}

/// A role rule, matched by Chef policy name or by Chef run-list roles
///
/// Chef policy and role names are matched ignoring case. A role that names
/// neither Chef policies nor Chef roles matches the Chef role carrying its
/// own name; that default is never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Rule name
    pub name: String,

    /// Policies granted to matching nodes
    #[serde(default)]
    pub policies: Vec<String>,

    /// Chef policy names this rule matches exactly
    #[serde(default)]
    pub chef_policy_names: Vec<String>,

    /// Chef role names; a node carrying any of them matches
    #[serde(default)]
    pub chef_role_names: Vec<String>,

    /// Lease granted to matching nodes
    #[serde(flatten)]
    pub lease: LeaseParams,
}

impl Role {
    /// Create a new role rule
    pub fn new(name: impl Into<String>, lease: LeaseParams) -> Self {
        Self {
            name: name.into(),
            policies: Vec::new(),
            chef_policy_names: Vec::new(),
            chef_role_names: Vec::new(),
            lease,
        }
    }

    /// Set the granted policies
    pub fn with_policies(mut self, policies: Vec<String>) -> Self {
        self.policies = policies;
        self
    }

    /// Set the Chef policy names matched by this rule
    pub fn with_chef_policy_names(mut self, names: Vec<String>) -> Self {
        self.chef_policy_names = names;
        self
    }

    /// Set the Chef role names matched by this rule
    pub fn with_chef_role_names(mut self, names: Vec<String>) -> Self {
        self.chef_role_names = names;
        self
    }

    /// Validate the rule and normalize its lease
    pub fn validate(mut self) -> Result<Self> {
        require_name("role", &self.name)?;
        self.lease = self.lease.normalize()?;
        Ok(self)
    }

    /// Whether this rule matches a node's Chef policy name
    pub fn matches_policy_name(&self, policy_name: &str) -> bool {
        self.chef_policy_names.iter().any(|p| same_name(p, policy_name))
    }

    /// Chef role names this rule matches, including the own-name default
    pub fn effective_chef_role_names(&self) -> Vec<&str> {
        if self.chef_policy_names.is_empty() && self.chef_role_names.is_empty() {
            vec![self.name.as_str()]
        } else {
            self.chef_role_names.iter().map(String::as_str).collect()
        }
    }

    /// Whether any of the node's Chef roles is named by this rule
    pub fn matches_any_role(&self, role_names: &[String]) -> bool {
        self.effective_chef_role_names()
            .into_iter()
            .any(|r| role_names.iter().any(|n| same_name(n, r)))
    }
}

/// A saved Chef search; nodes it returns gain extra policies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefSearch {
    /// Rule name
    pub name: String,

    /// Solr query run against the node index
    pub search_query: String,

    /// How long search results may be reused; zero disables caching
    #[serde(default, with = "duration_secs")]
    pub allowed_staleness: Duration,

    /// Policies granted to nodes returned by the search
    #[serde(default)]
    pub policies: Vec<String>,
}

impl ChefSearch {
    /// Create a new saved search
    pub fn new(name: impl Into<String>, search_query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search_query: search_query.into(),
            allowed_staleness: Duration::ZERO,
            policies: Vec::new(),
        }
    }

    /// Set the granted policies
    pub fn with_policies(mut self, policies: Vec<String>) -> Self {
        self.policies = policies;
        self
    }

    /// Set how long results may be cached
    pub fn with_allowed_staleness(mut self, staleness: Duration) -> Self {
        self.allowed_staleness = staleness;
        self
    }

    /// Whether results of this search may be cached
    pub fn is_cacheable(&self) -> bool {
        !self.allowed_staleness.is_zero()
    }

    /// Validate the rule
    pub fn validate(self) -> Result<Self> {
        require_name("search", &self.name)?;
        if self.search_query.trim().is_empty() {
            return Err(ChefAuthError::Validation("missing search_query".into()));
        }
        if self.allowed_staleness > MAX_ALLOWED_STALENESS {
            return Err(ChefAuthError::Validation(format!(
                "allowed_staleness may not exceed {} seconds",
                MAX_ALLOWED_STALENESS.as_secs()
            )));
        }
        Ok(self)
    }
}
