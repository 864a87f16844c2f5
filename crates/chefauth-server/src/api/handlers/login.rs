//! Login and Renewal Handlers
//!
//! Nodes log in with their name and client key; renewals present the
//! internal state returned at login.

use axum::{
    extract::{Path, State},
    Json,
};
use chefauth_core::{AuthDecision, GroupAlias};
use chefauth_inventory::InventoryClient;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::engine::AuthBackend;
use crate::storage::ConfigStore;

/// Application state shared across handlers
pub struct AppState {
    /// Authentication backend
    pub backend: AuthBackend,
}

impl AppState {
    /// Create state over a store and an inventory client
    pub fn new(store: Arc<dyn ConfigStore>, inventory: Arc<dyn InventoryClient>) -> Self {
        Self {
            backend: AuthBackend::new(store, inventory),
        }
    }
}

/// Request to log in
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    /// Node name; may instead be given in the path
    #[serde(default)]
    pub node_name: Option<String>,

    /// PEM private key of the node's Chef client
    #[serde(default)]
    pub private_key: Option<String>,
}

/// Request to renew a lease
#[derive(Debug, Deserialize)]
pub struct RenewRequest {
    /// Internal state returned at login
    #[serde(default)]
    pub internal_data: Value,
}

/// Authentication result
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub auth: AuthBody,
}

/// Policies, lease and metadata of an authenticated node
#[derive(Debug, Serialize)]
pub struct AuthBody {
    pub display_name: String,
    pub policies: Vec<String>,
    pub ttl: u64,
    pub max_ttl: u64,
    pub period: u64,
    pub renewable: bool,
    pub metadata: BTreeMap<String, String>,
    pub group_aliases: Vec<GroupAlias>,
    /// Opaque state to present on renewal
    pub internal_data: Value,
}

impl From<AuthDecision> for AuthResponse {
    fn from(decision: AuthDecision) -> Self {
        Self {
            auth: AuthBody {
                display_name: decision.display_name,
                policies: decision.policies,
                ttl: decision.lease.ttl.as_secs(),
                max_ttl: decision.lease.max_ttl.as_secs(),
                period: decision.lease.period.as_secs(),
                renewable: decision.renewable,
                metadata: decision.metadata,
                group_aliases: decision.group_aliases,
                internal_data: decision.internal.to_value(),
            },
        }
    }
}

/// Log in a node
///
/// POST /v1/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let node_name = request.node_name.unwrap_or_default();
    let private_key = request.private_key.unwrap_or_default();

    let decision = state.backend.login(&node_name, &private_key).await?;
    Ok(Json(decision.into()))
}

/// Log in a node named in the path
///
/// POST /v1/login/{node_name}
pub async fn login_named(
    State(state): State<Arc<AppState>>,
    Path(node_name): Path<String>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    if let Some(body_name) = request.node_name.as_deref() {
        if body_name != node_name {
            return Err(ApiError::BadRequest(format!(
                "node_name {} does not match path {}",
                body_name, node_name
            )));
        }
    }
    let private_key = request.private_key.unwrap_or_default();

    let decision = state.backend.login(&node_name, &private_key).await?;
    Ok(Json(decision.into()))
}

/// Renew a lease
///
/// POST /v1/renew
pub async fn renew(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RenewRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let decision = state.backend.renew(&request.internal_data).await?;
    Ok(Json(decision.into()))
}
