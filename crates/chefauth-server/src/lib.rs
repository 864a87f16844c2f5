//! Chefauth Server
//!
//! Authenticates Chef nodes and issues policies and leases:
//! - Verifies a node's identity by fetching its own node object from the
//!   Chef server, signed with the node's key
//! - Matches the node against Chef policy and role rules
//! - Adds policies from saved searches the node belongs to
//! - Re-authenticates on every renewal
//!
//! ## API Endpoints
//!
//! ### Login Endpoints
//! - `POST /v1/login` - Log in with `node_name` and `private_key`
//! - `POST /v1/login/{node_name}` - Same, with the node name in the path
//! - `POST /v1/renew` - Renew from the internal state returned at login
//!
//! ### Administration Endpoints
//! - `GET|POST /v1/config` - Chef host and default policies
//! - `GET /v1/policy`, `GET|POST|DELETE /v1/policy/{name}` - Chef policy rules
//! - `GET /v1/role`, `GET|POST|DELETE /v1/role/{name}` - Role rules
//! - `GET /v1/search`, `GET|POST|DELETE /v1/search/{name}` - Saved searches
//! - `POST /v1/search-refresh` - Drop cached search results
//! - `GET /health` - Liveness check

pub mod api;
pub mod config;
pub mod engine;
pub mod registry;
pub mod storage;

pub use api::create_router;
pub use api::handlers::AppState;
pub use config::ServerConfig;
pub use engine::{AuthBackend, SearchCache};
pub use registry::{Record, Registry, WriteMode};
pub use storage::{ConfigStore, MemoryStore, StorageError};
