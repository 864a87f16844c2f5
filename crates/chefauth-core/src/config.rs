//! Backend configuration set by the administrator

use crate::error::{ChefAuthError, Result};
use serde::{Deserialize, Serialize};

/// Chef server location and policies granted on every login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// A host, a host:port pair, or a URL to the base of the Chef server
    pub host: String,

    /// Policies appended to every successful login
    #[serde(default)]
    pub default_policies: Vec<String>,
}

impl BackendConfig {
    /// Create a configuration for the given Chef host
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            default_policies: Vec::new(),
        }
    }

    /// Set the default policies
    pub fn with_default_policies(mut self, policies: Vec<String>) -> Self {
        self.default_policies = policies;
        self
    }

    /// Validate the configuration
    pub fn validate(self) -> Result<Self> {
        if self.host.trim().is_empty() {
            return Err(ChefAuthError::Validation("no host provided".into()));
        }
        Ok(self)
    }

    /// Base URL of the Chef server; bare hosts are assumed to speak HTTPS
    pub fn base_url(&self) -> String {
        let host = self.host.trim().trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        }
    }
}
