//! Typed views of inventory data
//!
//! Chef returns loosely typed JSON. It is parsed here, once, into typed
//! records; matching logic never inspects raw JSON.

use crate::error::{ChefAuthError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// A Chef node as seen at login time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node name
    pub name: String,

    /// Chef policy name (Policyfile), if the node uses one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_name: Option<String>,

    /// Expanded run-list roles, in Chef's order
    #[serde(default)]
    pub role_names: Vec<String>,

    /// Chef server the node was authenticated against
    pub host: String,
}

impl NodeRecord {
    /// Create a node record with no policy name and no roles
    pub fn new(name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy_name: None,
            role_names: Vec::new(),
            host: host.into(),
        }
    }

    /// Set the Chef policy name
    pub fn with_policy_name(mut self, policy_name: impl Into<String>) -> Self {
        self.policy_name = Some(policy_name.into());
        self
    }

    /// Set the run-list roles
    pub fn with_role_names(mut self, role_names: Vec<String>) -> Self {
        self.role_names = role_names;
        self
    }

    /// The policy name, treating an empty string as absent
    pub fn effective_policy_name(&self) -> Option<&str> {
        self.policy_name.as_deref().filter(|p| !p.is_empty())
    }

    /// Parse a node object as returned by `GET /nodes/{name}`.
    ///
    /// Reads `name`, `policy_name` and `automatic.roles`. A missing or null
    /// `policy_name` or roles list is treated as empty; anything of the wrong
    /// type is a structural error.
    pub fn from_chef_node(node: &Value, host: &str) -> Result<Self> {
        let object = node
            .as_object()
            .ok_or_else(|| ChefAuthError::Structural("node is not a JSON object".into()))?;

        let name = match object.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(other) => {
                return Err(ChefAuthError::Structural(format!(
                    "node name {} is not a non-empty string",
                    other
                )))
            }
            None => return Err(ChefAuthError::Structural("node name is missing".into())),
        };

        let policy_name = match object.get("policy_name") {
            None | Some(Value::Null) => None,
            Some(Value::String(p)) if p.is_empty() => None,
            Some(Value::String(p)) => Some(p.clone()),
            Some(other) => {
                return Err(ChefAuthError::Structural(format!(
                    "policy_name {} is not a string",
                    other
                )))
            }
        };

        let roles = object
            .get("automatic")
            .and_then(|automatic| automatic.get("roles"));
        let role_names = match roles {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(String::from).ok_or_else(|| {
                        ChefAuthError::Structural(format!("role name {} is not a string", item))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            Some(other) => {
                return Err(ChefAuthError::Structural(format!(
                    "automatic.roles {} is not a list",
                    other
                )))
            }
        };

        Ok(Self {
            name,
            policy_name,
            role_names,
            host: host.to_string(),
        })
    }
}

/// Collect the node names from the rows of a search result.
///
/// Every row must be an object with a string `name`; one bad row fails the
/// whole result.
pub fn search_membership(rows: &[Value]) -> Result<HashSet<String>> {
    rows.iter()
        .map(|row| match row.get("name") {
            Some(Value::String(name)) => Ok(name.clone()),
            Some(other) => Err(ChefAuthError::Structural(format!(
                "search row name {} is not a string",
                other
            ))),
            None => Err(ChefAuthError::Structural(
                "search row has no name field".into(),
            )),
        })
        .collect()
}
