use axum::extract::FromRef;

use crate::inventory::InventoryRepository;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use super::auth::AuthManager;
use super::ServerConfig;

pub type GuardedInventory = Arc<Mutex<InventoryRepository>>;
pub type GuardedAuthManager = Arc<Mutex<AuthManager>>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub inventory: GuardedInventory,
    pub auth_manager: GuardedAuthManager,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedInventory {
    fn from_ref(input: &ServerState) -> Self {
        input.inventory.clone()
    }
}

impl FromRef<ServerState> for GuardedAuthManager {
    fn from_ref(input: &ServerState) -> Self {
        input.auth_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
