//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient, FILM_RED_SHOES_ID};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_get_film() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.get_media(FILM_RED_SHOES_ID).await;
//!     assert_eq!(response.status(), StatusCode::NOT_FOUND);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{book_document, film_document};
#[allow(unused_imports)]
pub use server::TestServer;
