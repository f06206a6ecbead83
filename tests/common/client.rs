//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all inventory-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client with cookie-based session management
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    /// Creates a new unauthenticated client
    ///
    /// Use this for testing authentication flows and the open read
    /// endpoints.
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .cookie_store(true) // Automatically handle session cookies
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    /// Creates a client pre-authenticated as a regular user
    pub async fn authenticated(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(TEST_USER, TEST_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Test user authentication failed: {:?}",
            response.text().await
        );

        client
    }

    /// Creates a client pre-authenticated as an admin user
    pub async fn authenticated_admin(base_url: String) -> Self {
        let client = Self::new(base_url);

        let response = client.login(ADMIN_USER, ADMIN_PASS).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Admin authentication failed: {:?}",
            response.text().await
        );

        client
    }

    // ========================================================================
    // Authentication Endpoints
    // ========================================================================

    /// POST /v1/auth/login
    pub async fn login(&self, user_id: &str, password: &str) -> Response {
        self.client
            .post(format!("{}/v1/auth/login", self.base_url))
            .json(&json!({
                "user_id": user_id,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed")
    }

    /// GET /v1/auth/logout
    pub async fn logout(&self) -> Response {
        self.client
            .get(format!("{}/v1/auth/logout", self.base_url))
            .send()
            .await
            .expect("Logout request failed")
    }

    // ========================================================================
    // Inventory Endpoints
    // ========================================================================

    /// GET /v1/inventory
    pub async fn list_inventory(&self) -> Response {
        self.client
            .get(format!("{}/v1/inventory", self.base_url))
            .send()
            .await
            .expect("List request failed")
    }

    /// GET /v1/inventory?search=...
    pub async fn search_inventory(&self, term: &str) -> Response {
        self.client
            .get(format!("{}/v1/inventory", self.base_url))
            .query(&[("search", term)])
            .send()
            .await
            .expect("Search request failed")
    }

    /// GET /v1/inventory/artist/{artist}
    pub async fn artist_albums(&self, artist: &str) -> Response {
        self.client
            .get(format!("{}/v1/inventory/artist/{}", self.base_url, artist))
            .send()
            .await
            .expect("Artist albums request failed")
    }

    /// POST /v1/inventory
    pub async fn create_record(&self, body: &Value) -> Response {
        self.client
            .post(format!("{}/v1/inventory", self.base_url))
            .json(body)
            .send()
            .await
            .expect("Create request failed")
    }

    /// PUT /v1/inventory/{serial}
    pub async fn update_record(&self, serial: u64, body: &Value) -> Response {
        self.client
            .put(format!("{}/v1/inventory/{}", self.base_url, serial))
            .json(body)
            .send()
            .await
            .expect("Update request failed")
    }

    /// DELETE /v1/inventory/{serial}
    pub async fn delete_record(&self, serial: u64) -> Response {
        self.client
            .delete(format!("{}/v1/inventory/{}", self.base_url, serial))
            .send()
            .await
            .expect("Delete request failed")
    }

    /// POST /v1/inventory/sort
    pub async fn sort_inventory(&self) -> Response {
        self.client
            .post(format!("{}/v1/inventory/sort", self.base_url))
            .send()
            .await
            .expect("Sort request failed")
    }
}
