//! API module for the chefauth server

pub mod error;
pub mod handlers;

use axum::{
    routing::{get, post},
    Json, Router,
};
use chefauth_core::{ChefPolicy, ChefSearch, Role};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check endpoint
///
/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health endpoints
        .route("/health", get(health))
        // Backend configuration
        .route(
            "/v1/config",
            get(handlers::read_config).post(handlers::write_config),
        )
        // Login endpoints
        .route("/v1/login", post(handlers::login))
        .route("/v1/login/{node_name}", post(handlers::login_named))
        .route("/v1/renew", post(handlers::renew))
        // Rule endpoints
        .route("/v1/policy", get(handlers::list_records::<ChefPolicy>))
        .route(
            "/v1/policy/{name}",
            get(handlers::read_record::<ChefPolicy>)
                .post(handlers::write_policy)
                .delete(handlers::delete_policy),
        )
        .route("/v1/role", get(handlers::list_records::<Role>))
        .route(
            "/v1/role/{name}",
            get(handlers::read_record::<Role>)
                .post(handlers::write_role)
                .delete(handlers::delete_role),
        )
        .route("/v1/search", get(handlers::list_records::<ChefSearch>))
        .route(
            "/v1/search/{name}",
            get(handlers::read_record::<ChefSearch>)
                .post(handlers::write_search)
                .delete(handlers::delete_search),
        )
        .route("/v1/search-refresh", post(handlers::refresh_searches))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
