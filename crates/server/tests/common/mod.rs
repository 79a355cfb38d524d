//! Common test utilities for in-process API testing.
//!
//! This module provides a test fixture that builds the real router over a
//! SQLite catalog in a temporary directory, so tests exercise the full
//! request path without binding a socket.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use magneticow_core::{
    Config, DatabaseConfig, NewTorrent, SearchConfig, ServerConfig, SqliteCatalog, TorrentCatalog,
};
use magneticow_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use magneticow_core::testing::fixtures;

/// Test fixture for in-process API testing.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_search() {
///     let fixture = TestFixture::new();
///     fixture.seed(vec![fixtures::torrent(1, "debian", 100)]);
///
///     let response = fixture.get("/api/v0.1/torrents").await;
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// The catalog behind the router, for seeding and mutating
    pub catalog: Arc<SqliteCatalog>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Body parsed as JSON, `Value::Null` when empty or not JSON.
    pub body: Value,
    /// Body as raw text.
    pub text: String,
}

impl TestResponse {
    /// Value of a response header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

impl TestFixture {
    /// Create a fixture with the default page size.
    pub fn new() -> Self {
        Self::with_page_size(SearchConfig::default().page_size)
    }

    /// Create a fixture whose search pages hold `page_size` records.
    pub fn with_page_size(page_size: u32) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            search: SearchConfig { page_size },
        };

        let catalog = Arc::new(SqliteCatalog::new(&db_path).expect("Failed to create catalog"));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&catalog) as Arc<dyn TorrentCatalog>,
        ));

        let router = create_router(state);

        Self {
            router,
            catalog,
            temp_dir,
        }
    }

    /// Insert torrents into the catalog, returning their ids.
    pub fn seed(&self, torrents: Vec<NewTorrent>) -> Vec<i64> {
        torrents
            .iter()
            .map(|t| self.catalog.insert(t).expect("Failed to insert torrent"))
            .collect()
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let text = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            $response.text
        );
    };
}

/// Helper to assert a JSON path equals expected value.
#[macro_export]
macro_rules! assert_json_path {
    ($json:expr, $path:expr, $expected:expr) => {
        let actual = &$json[$path];
        assert_eq!(
            actual, &$expected,
            "Path '{}' expected {:?}, got {:?}",
            $path, $expected, actual
        );
    };
}
