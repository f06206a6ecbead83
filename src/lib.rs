//! Music Inventory Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod file_auth_store;
pub mod inventory;
pub mod server;

// Re-export commonly used types for convenience
pub use file_auth_store::FileAuthStore;
pub use inventory::{InventoryRepository, JsonFileStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
