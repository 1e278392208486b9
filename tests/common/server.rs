//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own SQLite database.

use super::constants::*;
use medialist_server::jobs::{JobContext, JobRunner, SyncJob};
use medialist_server::server::{make_app, RequestsLoggingLevel, ServerConfig};
use medialist_server::store::{MediaItem, MediaStore, SqliteMediaStore};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance with an isolated database
///
/// When dropped, the server gracefully shuts down and temp resources are
/// cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    pub port: u16,

    /// Store handle for seeding and inspecting state directly
    pub store: Arc<SqliteMediaStore>,

    // Private fields - keep resources alive until drop
    _temp_db_dir: TempDir,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a test server with no sync jobs registered.
    pub async fn spawn() -> Self {
        Self::spawn_with_jobs(Vec::new()).await
    }

    /// Spawns a new test server on a random port
    ///
    /// This function:
    /// 1. Creates a temporary directory holding a fresh media database
    /// 2. Registers the given sync jobs (usually built against stub
    ///    upstream servers)
    /// 3. Binds to a random port (127.0.0.1:0)
    /// 4. Spawns the server in a background task
    /// 5. Waits for the server to be ready
    ///
    /// # Panics
    ///
    /// Panics if the database cannot be created, the port cannot be bound
    /// or the server does not become ready within the timeout.
    pub async fn spawn_with_jobs(jobs: Vec<Arc<dyn SyncJob>>) -> Self {
        let temp_db_dir = TempDir::new().expect("Failed to create temp db dir");
        let db_path = temp_db_dir.path().join("medialist.db");
        let store =
            Arc::new(SqliteMediaStore::new(&db_path).expect("Failed to open media store"));

        let mut job_runner = JobRunner::new(JobContext::new(store.clone() as Arc<dyn MediaStore>));
        for job in jobs {
            job_runner.register(job);
        }

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
        };

        let app = make_app(
            config,
            store.clone() as Arc<dyn MediaStore>,
            Arc::new(job_runner),
        )
        .expect("Failed to build app");

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
            _temp_db_dir: temp_db_dir,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Inserts a document straight into the store, bypassing HTTP.
    pub fn seed(&self, document: Value) {
        let item = MediaItem::from_value(document).expect("Invalid seed document");
        self.store.upsert_item(&item).expect("Failed to seed item");
    }

    /// Waits for the server to become ready by polling the status endpoint
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
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
        // TempDir cleans up the database files
    }
}
