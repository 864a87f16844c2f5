//! Process configuration
//!
//! Read once at start-up from environment variables. The Chef server
//! location itself is set at runtime through the API.

use anyhow::{Context, Result};
use chefauth_inventory::ChefClientConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::Level;

/// Server configuration sourced from environment variables
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub log_level: Level,
    pub chef_timeout: Duration,
    pub chef_insecure_skip_verify: bool,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port: u16 = lookup("CHEFAUTH_PORT")
            .unwrap_or_else(|| "8200".to_string())
            .parse()
            .with_context(|| "parse CHEFAUTH_PORT")?;
        let bind = lookup("CHEFAUTH_BIND").unwrap_or_else(|| "0.0.0.0".to_string());
        let bind_addr = format!("{}:{}", bind, port)
            .parse()
            .with_context(|| format!("parse CHEFAUTH_BIND: {bind}"))?;

        // Unknown levels fall back to info
        let log_level = lookup("CHEFAUTH_LOG_LEVEL")
            .and_then(|level| level.parse().ok())
            .unwrap_or(Level::INFO);

        let timeout_secs: u64 = lookup("CHEFAUTH_CHEF_TIMEOUT_SECS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .with_context(|| "parse CHEFAUTH_CHEF_TIMEOUT_SECS")?;
        if timeout_secs == 0 {
            anyhow::bail!("CHEFAUTH_CHEF_TIMEOUT_SECS must be positive");
        }

        let chef_insecure_skip_verify = match lookup("CHEFAUTH_CHEF_INSECURE_SKIP_VERIFY") {
            Some(value) => value
                .parse()
                .with_context(|| "parse CHEFAUTH_CHEF_INSECURE_SKIP_VERIFY")?,
            None => false,
        };

        Ok(Self {
            bind_addr,
            log_level,
            chef_timeout: Duration::from_secs(timeout_secs),
            chef_insecure_skip_verify,
        })
    }

    /// Settings for the Chef HTTP client
    pub fn chef_client(&self) -> ChefClientConfig {
        ChefClientConfig::default()
            .with_timeout(self.chef_timeout)
            .with_insecure_skip_verify(self.chef_insecure_skip_verify)
    }
}
