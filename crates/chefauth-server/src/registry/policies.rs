//! Chef policy records

use chefauth_core::{ChefPolicy, LeaseParams, Result};
use serde::Deserialize;

use super::{secs, Record};

/// Fields of a Chef policy write; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PolicyPatch {
    pub policies: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub ttl: Option<u64>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub max_ttl: Option<u64>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub period: Option<u64>,
}

impl PolicyPatch {
    fn lease_over(&self, base: LeaseParams) -> LeaseParams {
        LeaseParams::new(
            secs(self.ttl).unwrap_or(base.ttl),
            secs(self.max_ttl).unwrap_or(base.max_ttl),
            secs(self.period).unwrap_or(base.period),
        )
    }
}

impl Record for ChefPolicy {
    const PREFIX: &'static str = "policy/";
    const KIND: &'static str = "policy";
    type Patch = PolicyPatch;

    fn name(&self) -> &str {
        &self.name
    }

    fn create(name: &str, patch: PolicyPatch) -> Result<Self> {
        let lease = patch.lease_over(LeaseParams::default());
        ChefPolicy::new(name, lease)
            .with_policies(patch.policies.unwrap_or_default())
            .validate()
    }

    fn update(mut self, patch: PolicyPatch) -> Result<Self> {
        self.lease = patch.lease_over(self.lease);
        if let Some(policies) = patch.policies {
            self.policies = policies;
        }
        self.validate()
    }
}
