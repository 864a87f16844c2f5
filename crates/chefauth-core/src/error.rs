//! Error types for Chef node authentication

use thiserror::Error;

/// Result type alias using ChefAuthError
pub type Result<T> = std::result::Result<T, ChefAuthError>;

/// Errors that can occur while resolving or administering Chef auth rules
#[derive(Error, Debug)]
pub enum ChefAuthError {
    /// A request field is missing or invalid
    #[error("Invalid request: {0}")]
    Validation(String),

    /// The backend has no Chef host configured yet
    #[error("Backend is not configured: no Chef host set")]
    NotConfigured,

    /// The inventory rejected the node, or no rule matched it
    #[error("Permission denied: {0}")]
    AuthDenied(String),

    /// Backing store I/O failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// A persisted record could not be decoded
    #[error("Corrupt record at '{key}': {reason}")]
    Decode { key: String, reason: String },

    /// Inventory data did not have the expected shape
    #[error("Malformed inventory data: {0}")]
    Structural(String),

    /// The inventory could not be reached while evaluating searches
    #[error("Inventory error: {0}")]
    Inventory(String),

    /// Create was requested for a record that already exists
    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    /// Update was requested for a record that does not exist
    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },
}

impl ChefAuthError {
    /// Whether this error denies the caller rather than signalling a fault
    pub fn is_denial(&self) -> bool {
        matches!(self, ChefAuthError::AuthDenied(_))
    }

    /// Build a decode error for the record stored at `key`
    pub fn decode(key: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ChefAuthError::Decode {
            key: key.into(),
            reason: err.to_string(),
        }
    }
}
