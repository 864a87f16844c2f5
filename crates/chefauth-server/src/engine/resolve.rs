//! Login resolution
//!
//! 1. Authenticate the node against the Chef server with its own key
//! 2. Match it against policy and role rules (policy name first)
//! 3. Add policies of the saved searches it belongs to
//! 4. Append the configured default policies and `"default"`

use chefauth_core::{
    AuthDecision, AuthDecisionBuilder, ChefAuthError, ChefPolicy, ChefSearch, NodeRecord, Result,
    Role, RuleMatch,
};
use chefauth_inventory::NodeCredentials;
use tracing::{debug, info, warn};

use super::AuthBackend;
use crate::registry::RegistryReader;

impl AuthBackend {
    /// Authenticate a node and decide its policies and lease
    ///
    /// # Errors
    /// * `Validation` - missing node name or private key
    /// * `NotConfigured` - no Chef host set
    /// * `AuthDenied` - the Chef server rejected the node, or no rule matched
    /// * `Structural` / `Inventory` - a saved search could not be evaluated
    pub async fn login(&self, node_name: &str, private_key: &str) -> Result<AuthDecision> {
        if node_name.trim().is_empty() {
            return Err(ChefAuthError::Validation("missing node_name".into()));
        }
        if private_key.trim().is_empty() {
            return Err(ChefAuthError::Validation("missing private_key".into()));
        }

        let config = self
            .registry
            .config()
            .await?
            .ok_or(ChefAuthError::NotConfigured)?;
        let credentials = NodeCredentials::new(config.base_url(), node_name, private_key);

        let node = self
            .inventory
            .authenticate_node(&credentials)
            .await
            .map_err(|e| {
                warn!(node_name = %node_name, error = %e, "Chef authentication failed");
                ChefAuthError::AuthDenied(format!("node {} could not be authenticated", node_name))
            })?;

        let (rule, searches) = {
            let reader = self.registry.read().await;
            let rule = match_rules(&reader, &node).await?;
            let searches = reader.load_all::<ChefSearch>().await?;
            (rule, searches)
        };

        let matches = self
            .cache
            .matching_searches(self.inventory.as_ref(), &credentials, &searches)
            .await?;

        let decision = AuthDecisionBuilder::new(&node.name, private_key, rule)
            .host(node.host.clone())
            .searches(matches.policies, matches.names)
            .default_policies(config.default_policies)
            .build();

        info!(
            node_name = %decision.display_name,
            policies = ?decision.policies,
            ttl = decision.lease.ttl.as_secs(),
            period = decision.lease.period.as_secs(),
            "Node authenticated"
        );
        Ok(decision)
    }
}

/// Find the rule granting a node access
///
/// A node with a Chef policy name is matched only by that name: first the
/// Chef policy of that name, then every role listing it. Otherwise every
/// role naming one of the node's run-list roles matches.
pub(crate) async fn match_rules(reader: &RegistryReader<'_>, node: &NodeRecord) -> Result<RuleMatch> {
    if let Some(policy_name) = node.effective_policy_name() {
        if let Some(policy) = reader.get::<ChefPolicy>(policy_name).await? {
            debug!(node_name = %node.name, policy = %policy.name, "Matched Chef policy");
            return Ok(RuleMatch::from_policy(&policy));
        }

        let roles: Vec<Role> = reader
            .load_all::<Role>()
            .await?
            .into_iter()
            .filter(|role| role.matches_policy_name(policy_name))
            .collect();

        return RuleMatch::from_roles(&roles).ok_or_else(|| {
            ChefAuthError::AuthDenied(format!("no rule matches Chef policy {}", policy_name))
        });
    }

    let roles: Vec<Role> = reader
        .load_all::<Role>()
        .await?
        .into_iter()
        .filter(|role| role.matches_any_role(&node.role_names))
        .collect();

    RuleMatch::from_roles(&roles).ok_or_else(|| {
        ChefAuthError::AuthDenied(format!("no rule matches the roles of node {}", node.name))
    })
}
