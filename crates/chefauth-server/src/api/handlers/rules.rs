//! Rule Management Handlers
//!
//! CRUD over Chef policies, roles and saved searches. Writes are partial:
//! fields absent from the body keep their stored values. A write creates the
//! record when it does not exist yet.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chefauth_core::{ChefPolicy, ChefSearch, Role};
use serde::Serialize;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::handlers::login::AppState;
use crate::registry::{PolicyPatch, Record, RolePatch, SearchPatch, WriteMode};

/// Names of stored records
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub keys: Vec<String>,
    pub count: usize,
}

/// Response from cache refresh
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    /// Number of cached search results dropped
    pub flushed: usize,
}

fn written<R>((record, created): (R, bool)) -> (StatusCode, Json<R>) {
    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    (status, Json(record))
}

/// List records of one kind
///
/// GET /v1/{policy,role,search}
pub async fn list_records<R: Record>(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, ApiError> {
    let keys = state.backend.list::<R>().await?;
    let count = keys.len();
    Ok(Json(ListResponse { keys, count }))
}

/// Read one record
///
/// GET /v1/{policy,role,search}/{name}
pub async fn read_record<R: Record>(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<R>, ApiError> {
    state
        .backend
        .get::<R>(&name)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("{} '{}' not found", R::KIND, name)))
}

/// POST /v1/policy/{name}
pub async fn write_policy(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(patch): Json<PolicyPatch>,
) -> Result<(StatusCode, Json<ChefPolicy>), ApiError> {
    let result = state.backend.write_policy(&name, patch, WriteMode::Upsert).await?;
    Ok(written(result))
}

/// POST /v1/role/{name}
pub async fn write_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(patch): Json<RolePatch>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    let result = state.backend.write_role(&name, patch, WriteMode::Upsert).await?;
    Ok(written(result))
}

/// POST /v1/search/{name}
pub async fn write_search(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    Json(patch): Json<SearchPatch>,
) -> Result<(StatusCode, Json<ChefSearch>), ApiError> {
    let result = state.backend.write_search(&name, patch, WriteMode::Upsert).await?;
    Ok(written(result))
}

/// DELETE /v1/policy/{name}
pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backend.delete_policy(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/role/{name}
pub async fn delete_role(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backend.delete_role(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /v1/search/{name}
pub async fn delete_search(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.backend.delete_search(&name).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Drop every cached search result
///
/// POST /v1/search-refresh
pub async fn refresh_searches(State(state): State<Arc<AppState>>) -> Json<RefreshResponse> {
    Json(RefreshResponse {
        flushed: state.backend.refresh_searches(),
    })
}
