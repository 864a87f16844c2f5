//! Error types for Chef inventory access

use chefauth_core::ChefAuthError;
use thiserror::Error;

/// Result type for inventory operations
pub type Result<T> = std::result::Result<T, InventoryError>;

/// Errors that can occur while talking to the Chef server
#[derive(Error, Debug)]
pub enum InventoryError {
    /// The Chef server rejected the node's credentials
    #[error("Node authentication denied: {0}")]
    Denied(String),

    /// The private key could not be parsed or used for signing
    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    /// Transport failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The Chef server answered with an unexpected status
    #[error("Chef server returned {status} for {path}")]
    Status { status: u16, path: String },

    /// The response body did not have the expected shape
    #[error("Invalid response from Chef server: {0}")]
    InvalidResponse(String),

    /// The request did not complete within the configured timeout
    #[error("Request to Chef server timed out")]
    Timeout,
}

impl InventoryError {
    /// Whether the node itself was rejected
    pub fn is_denial(&self) -> bool {
        matches!(self, InventoryError::Denied(_) | InventoryError::InvalidKey(_))
    }
}

impl From<reqwest::Error> for InventoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InventoryError::Timeout
        } else {
            InventoryError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for InventoryError {
    fn from(err: serde_json::Error) -> Self {
        InventoryError::InvalidResponse(err.to_string())
    }
}

impl From<InventoryError> for ChefAuthError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Denied(_) | InventoryError::InvalidKey(_) => {
                ChefAuthError::AuthDenied(err.to_string())
            }
            InventoryError::InvalidResponse(msg) => ChefAuthError::Structural(msg),
            other => ChefAuthError::Inventory(other.to_string()),
        }
    }
}
