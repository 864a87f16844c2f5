//! Chefauth Server Binary
//!
//! Runs the HTTP server authenticating Chef nodes.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

use chefauth_inventory::{ChefClient, InventoryClient};
use chefauth_server::{create_router, AppState, ConfigStore, MemoryStore, ServerConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::from_env()?;

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("set tracing subscriber")?;

    // Chef client, shared by all logins
    let inventory: Arc<dyn InventoryClient> =
        Arc::new(ChefClient::new(config.chef_client()).context("build Chef client")?);

    // Rules and configuration live in memory only
    let store: Arc<dyn ConfigStore> = Arc::new(MemoryStore::new());

    info!(
        bind = %config.bind_addr,
        chef_timeout_secs = config.chef_timeout.as_secs(),
        "Starting chefauth server"
    );

    let state = Arc::new(AppState::new(store, inventory));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("bind {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "chefauth listening");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
