//! Lease renewal
//!
//! Renewal re-authenticates the node with the key kept in the lease's
//! internal state and recomputes its decision from current rules. Nothing
//! from the original decision is reused.

use chefauth_core::{AuthDecision, LeaseState, Result};
use serde_json::Value;
use tracing::{info, warn};

use super::AuthBackend;

impl AuthBackend {
    /// Renew a lease from its internal state
    ///
    /// Missing or malformed state is denied.
    pub async fn renew(&self, internal: &Value) -> Result<AuthDecision> {
        let state = LeaseState::from_value(internal).map_err(|e| {
            warn!(error = %e, "Rejected renewal with invalid lease state");
            e
        })?;

        let decision = self.login(&state.node_name, &state.private_key).await?;

        info!(
            node_name = %state.node_name,
            previous = %state.matched.display_names(),
            "Lease renewed"
        );
        Ok(decision)
    }
}
