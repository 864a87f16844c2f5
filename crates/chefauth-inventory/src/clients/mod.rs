//! Inventory client implementations

pub mod chef;
pub mod mock;

pub use chef::{ChefClient, ChefClientConfig};
pub use mock::MockInventory;
