//! Backend Configuration Handlers

use axum::{extract::State, Json};
use chefauth_core::BackendConfig;
use serde::Deserialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::handlers::login::AppState;

/// Request to configure the backend
#[derive(Debug, Deserialize)]
pub struct ConfigRequest {
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub default_policies: Vec<String>,
}

/// Read the backend configuration
///
/// GET /v1/config
pub async fn read_config(
    State(state): State<Arc<AppState>>,
) -> Result<Json<BackendConfig>, ApiError> {
    match state.backend.config().await? {
        Some(config) => Ok(Json(config)),
        None => Err(ApiError::NotFound("backend is not configured".into())),
    }
}

/// Replace the backend configuration
///
/// POST /v1/config
pub async fn write_config(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ConfigRequest>,
) -> Result<Json<BackendConfig>, ApiError> {
    let config = BackendConfig::new(request.host).with_default_policies(request.default_policies);
    let stored = state.backend.set_config(config).await?;
    Ok(Json(stored))
}
