//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own temporary shows database.

use super::constants::*;
use super::fixtures::sample_shows;
use show_catalog_server::auth::TokenIssuer;
use show_catalog_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use show_catalog_server::show_store::{NewShow, ShowStore, SqliteShowStore};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    /// Store for direct database access in tests
    #[allow(dead_code)]
    pub store: Arc<SqliteShowStore>,

    /// Issuer sharing the server's secret, for minting tokens directly
    #[allow(dead_code)]
    pub token_issuer: Arc<TokenIssuer>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server with an empty database on a random port
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound or
    /// the server doesn't become ready within timeout.
    pub async fn spawn() -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_db_dir.path().join("shows.db");

        let store = Arc::new(SqliteShowStore::new(&db_path, 2).expect("Failed to open show store"));
        let token_issuer = Arc::new(TokenIssuer::new(
            TEST_USER,
            TEST_SECRET.as_bytes(),
            chrono::Duration::minutes(30),
        ));

        // Bind to random port
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
            metrics_port: 0,
            requests_logging_level: RequestsLoggingLevel::None,
        };
        let app = make_app(config, store.clone(), token_issuer.clone());

        // Spawn server in background task with graceful shutdown
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
            store,
            token_issuer,
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Spawns a server whose database already holds the sample catalog
    #[allow(dead_code)]
    pub async fn spawn_with_sample_shows() -> Self {
        let server = Self::spawn().await;
        for show in sample_shows() {
            let new_show: NewShow =
                serde_json::from_value(show).expect("Sample show does not deserialize");
            server
                .store
                .create_show(new_show)
                .expect("Failed to seed sample show");
        }
        server
    }

    /// Waits for the server to become ready by polling the public home route
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
                Ok(response) if response.status().is_success() => return,
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
        // TempDir cleans itself up
    }
}
