//! Role records

use chefauth_core::{LeaseParams, Result, Role};
use serde::Deserialize;

use super::{secs, Record};

/// Fields of a role write; absent fields keep their stored value
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RolePatch {
    pub policies: Option<Vec<String>>,
    pub chef_policy_names: Option<Vec<String>>,
    pub chef_role_names: Option<Vec<String>>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub ttl: Option<u64>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub max_ttl: Option<u64>,
    #[serde(default, deserialize_with = "crate::registry::duration_field")]
    pub period: Option<u64>,
}

impl Record for Role {
    const PREFIX: &'static str = "role/";
    const KIND: &'static str = "role";
    type Patch = RolePatch;

    fn name(&self) -> &str {
        &self.name
    }

    fn create(name: &str, patch: RolePatch) -> Result<Self> {
        Role::new(name, LeaseParams::default()).update(patch)
    }

    fn update(mut self, patch: RolePatch) -> Result<Self> {
        self.lease = LeaseParams::new(
            secs(patch.ttl).unwrap_or(self.lease.ttl),
            secs(patch.max_ttl).unwrap_or(self.lease.max_ttl),
            secs(patch.period).unwrap_or(self.lease.period),
        );
        if let Some(policies) = patch.policies {
            self.policies = policies;
        }
        if let Some(names) = patch.chef_policy_names {
            self.chef_policy_names = names;
        }
        if let Some(names) = patch.chef_role_names {
            self.chef_role_names = names;
        }
        self.validate()
    }
}
