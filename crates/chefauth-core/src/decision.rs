//! Authentication decisions
//!
//! An [`AuthDecision`] is what a successful login or renewal produces:
//! - the merged policy set (rule policies, search policies, defaults, `"default"`)
//! - the lease, taken only from the policy/role match
//! - display metadata and group aliases
//! - the opaque [`LeaseState`] needed to re-authenticate on renewal

use crate::error::{ChefAuthError, Result};
use crate::lease::LeaseParams;
use crate::rules::{ChefPolicy, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// Policy every authenticated node receives
pub const DEFAULT_POLICY: &str = "default";

/// Metadata key holding the node name
pub const META_NODE_NAME: &str = "node_name";
/// Metadata key holding the matched Chef policy rule
pub const META_POLICY: &str = "policy";
/// Metadata key holding the matched role rules
pub const META_ROLE: &str = "role";
/// Metadata key holding the matched saved searches
pub const META_MATCHED_SEARCHES: &str = "chef-matched-searches";
/// Metadata key holding the Chef host
pub const META_HOST: &str = "host";

/// Which rule granted a login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "names", rename_all = "lowercase")]
pub enum MatchedRule {
    /// A Chef policy rule, by name
    Policy(String),
    /// One or more role rules, by name
    Roles(Vec<String>),
}

impl MatchedRule {
    /// Names of the matched rules joined for display
    pub fn display_names(&self) -> String {
        match self {
            MatchedRule::Policy(name) => name.clone(),
            MatchedRule::Roles(names) => names.join(","),
        }
    }
}

/// Result of matching a node against the policy and role rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Rule(s) that matched
    pub matched: MatchedRule,
    /// Union of the rules' policies
    pub policies: Vec<String>,
    /// Merged lease of the rules
    pub lease: LeaseParams,
    /// One group alias per matched rule
    pub group_aliases: Vec<GroupAlias>,
}

impl RuleMatch {
    /// Match from a single Chef policy rule
    pub fn from_policy(policy: &ChefPolicy) -> Self {
        Self {
            matched: MatchedRule::Policy(policy.name.clone()),
            policies: policy.policies.clone(),
            lease: policy.lease,
            group_aliases: vec![GroupAlias::new(format!("policy-{}", policy.name))],
        }
    }

    /// Match from every role rule that applies; `None` when there is none
    pub fn from_roles(roles: &[Role]) -> Option<Self> {
        let (first, rest) = roles.split_first()?;

        let mut policies = first.policies.clone();
        let mut lease = first.lease;
        for role in rest {
            policies.extend(role.policies.iter().cloned());
            lease = lease.merge(&role.lease);
        }

        Some(Self {
            matched: MatchedRule::Roles(roles.iter().map(|r| r.name.clone()).collect()),
            policies,
            lease,
            group_aliases: roles
                .iter()
                .map(|r| GroupAlias::new(format!("role-{}", r.name)))
                .collect(),
        })
    }
}

/// Group alias attached to an issued token
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GroupAlias {
    pub name: String,
}

impl GroupAlias {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Internal state kept with an issued lease so it can be renewed.
///
/// Opaque to callers; the private key is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseState {
    /// Authenticated node name
    pub node_name: String,
    /// PEM private key used to re-authenticate the node
    pub private_key: String,
    /// Rule that matched at issue time
    pub matched: MatchedRule,
}

impl LeaseState {
    /// Encode for storage alongside the lease
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Decode persisted state. Anything absent or malformed is a denial.
    pub fn from_value(value: &Value) -> Result<Self> {
        let state: LeaseState = serde_json::from_value(value.clone())
            .map_err(|e| ChefAuthError::AuthDenied(format!("invalid lease state: {}", e)))?;

        if state.node_name.is_empty() {
            return Err(ChefAuthError::AuthDenied("lease state has no node name".into()));
        }
        if state.private_key.is_empty() {
            return Err(ChefAuthError::AuthDenied("lease state has no private key".into()));
        }
        Ok(state)
    }
}

impl fmt::Debug for LeaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LeaseState")
            .field("node_name", &self.node_name)
            .field("private_key", &"<redacted>")
            .field("matched", &self.matched)
            .finish()
    }
}

/// Outcome of a successful login or renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthDecision {
    /// Display name of the token (the node name)
    pub display_name: String,
    /// Deduplicated policy set
    pub policies: Vec<String>,
    /// Lease granted by the policy/role match
    pub lease: LeaseParams,
    /// Always true
    pub renewable: bool,
    /// Display metadata
    pub metadata: BTreeMap<String, String>,
    /// Group aliases, one per matched rule
    pub group_aliases: Vec<GroupAlias>,
    /// State needed for renewal
    pub internal: LeaseState,
}

/// Builder for [`AuthDecision`]
#[derive(Debug)]
pub struct AuthDecisionBuilder {
    node_name: String,
    private_key: String,
    host: String,
    rule: RuleMatch,
    search_policies: Vec<String>,
    matched_searches: Vec<String>,
    default_policies: Vec<String>,
}

impl AuthDecisionBuilder {
    /// Start a decision for an authenticated node and its rule match
    pub fn new(
        node_name: impl Into<String>,
        private_key: impl Into<String>,
        rule: RuleMatch,
    ) -> Self {
        Self {
            node_name: node_name.into(),
            private_key: private_key.into(),
            host: String::new(),
            rule,
            search_policies: Vec::new(),
            matched_searches: Vec::new(),
            default_policies: Vec::new(),
        }
    }

    /// Record the Chef host the node authenticated against
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Add policies and names of matching saved searches
    pub fn searches(mut self, policies: Vec<String>, names: Vec<String>) -> Self {
        self.search_policies = policies;
        self.matched_searches = names;
        self
    }

    /// Add the configured default policies
    pub fn default_policies(mut self, policies: Vec<String>) -> Self {
        self.default_policies = policies;
        self
    }

    /// Build the decision
    pub fn build(self) -> AuthDecision {
        let policies = dedup_policies(
            self.rule
                .policies
                .into_iter()
                .chain(self.search_policies)
                .chain(self.default_policies)
                .chain(std::iter::once(DEFAULT_POLICY.to_string())),
        );

        let mut metadata = BTreeMap::new();
        metadata.insert(META_NODE_NAME.to_string(), self.node_name.clone());
        let key = match self.rule.matched {
            MatchedRule::Policy(_) => META_POLICY,
            MatchedRule::Roles(_) => META_ROLE,
        };
        metadata.insert(key.to_string(), self.rule.matched.display_names());
        if !self.matched_searches.is_empty() {
            metadata.insert(
                META_MATCHED_SEARCHES.to_string(),
                self.matched_searches.join(","),
            );
        }
        if !self.host.is_empty() {
            metadata.insert(META_HOST.to_string(), self.host);
        }

        AuthDecision {
            display_name: self.node_name.clone(),
            policies,
            lease: self.rule.lease,
            renewable: true,
            metadata,
            group_aliases: self.rule.group_aliases,
            internal: LeaseState {
                node_name: self.node_name,
                private_key: self.private_key,
                matched: self.rule.matched,
            },
        }
    }
}

/// Drop empty and repeated policy names, keeping first-seen order
pub fn dedup_policies(policies: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    policies
        .into_iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty() && seen.insert(p.clone()))
        .collect()
}
