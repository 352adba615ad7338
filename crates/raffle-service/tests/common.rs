//! Common test utilities for raffle service integration tests.

#![allow(dead_code)] // Some utilities are used by different test files

use std::sync::Arc;

use axum::Router;
use axum_test::TestServer;

use raffle_service::{create_router, AppState, ServiceConfig};
use raffle_store::{MemoryStore, Store};

/// PIN configured on every harness.
pub const TEST_PIN: &str = "4321";

/// Test harness containing everything needed for integration tests.
pub struct TestHarness {
    /// The test server for making HTTP requests.
    pub server: TestServer,
    /// The store behind the server, for direct inspection.
    pub store: Arc<MemoryStore>,
}

impl TestHarness {
    /// Create a new test harness with an empty in-memory store.
    pub fn new() -> Self {
        Self::with_pin(Some(TEST_PIN))
    }

    /// Create a harness with the given admin PIN (or none).
    pub fn with_pin(pin: Option<&str>) -> Self {
        let store = Arc::new(MemoryStore::new());

        let config = ServiceConfig {
            listen_addr: "127.0.0.1:0".into(),
            admin_pin: pin.map(str::to_string),
            session_secret: "test-session-secret".into(),
            ..ServiceConfig::default()
        };

        let state = AppState::new(store.clone() as Arc<dyn Store>, config);
        let router: Router = create_router(state);

        let server = TestServer::new(router).expect("Failed to create test server");

        Self { server, store }
    }

    /// Reserve a slot through the API.
    pub async fn reserve(&self, slot: i64, buyer_name: &str) {
        self.server
            .post("/api/raffle")
            .json(&serde_json::json!({
                "slot": slot,
                "buyer_name": buyer_name,
                "phone": "11999990000"
            }))
            .await
            .assert_status_ok();
    }

    /// Obtain an admin session token.
    pub async fn session_token(&self) -> String {
        let response = self
            .server
            .post("/api/admin/session")
            .json(&serde_json::json!({ "pin": TEST_PIN }))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["token"].as_str().expect("token").to_string()
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
