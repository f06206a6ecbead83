//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own inventory and auth store.

use super::constants::*;
use super::fixtures::{create_test_auth_store, create_test_inventory};
use music_inventory_server::file_auth_store::FileAuthStore;
use music_inventory_server::inventory::{InventoryDocument, InventoryRepository, JsonFileStore};
use music_inventory_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with isolated inventory and auth store
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Path of the inventory file backing this server
    pub inventory_path: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with the seed inventory
    /// and the two test users.
    pub async fn spawn() -> Self {
        let (temp_dir, inventory_path) =
            create_test_inventory().expect("Failed to create test inventory");
        let auth_store_path =
            create_test_auth_store(&temp_dir).expect("Failed to create test auth store");

        let repository =
            InventoryRepository::new(Box::new(JsonFileStore::new(inventory_path.clone())));
        let auth_store = Box::new(FileAuthStore::initialize(auth_store_path));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
        };

        let app = make_app(config, repository, auth_store).expect("Failed to build app");

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            port,
            inventory_path,
            _temp_dir: temp_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Reads the inventory file back from disk, for asserting on what was
    /// actually persisted.
    pub fn persisted_inventory(&self) -> InventoryDocument {
        let text =
            std::fs::read_to_string(&self.inventory_path).expect("Failed to read inventory file");
        serde_json::from_str(&text).expect("Failed to parse inventory file")
    }

    /// Waits for the server to become ready by polling the home endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => {
                    return;
                }
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
