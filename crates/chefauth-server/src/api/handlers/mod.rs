//! API request handlers

pub mod config;
pub mod login;
pub mod rules;

pub use config::{read_config, write_config, ConfigRequest};
pub use login::{login, login_named, renew, AppState, AuthBody, AuthResponse, LoginRequest, RenewRequest};
pub use rules::{
    delete_policy, delete_role, delete_search, list_records, read_record, refresh_searches,
    write_policy, write_role, write_search, ListResponse, RefreshResponse,
};
