//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all media-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // System Endpoints
    // ========================================================================

    /// GET /
    pub async fn get_status(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Get status request failed")
    }

    // ========================================================================
    // Media Endpoints
    // ========================================================================

    /// GET /v1/media
    pub async fn list_media(&self) -> Response {
        self.client
            .get(format!("{}/v1/media", self.base_url))
            .send()
            .await
            .expect("List media request failed")
    }

    /// GET /v1/media/{id}
    pub async fn get_media(&self, id: &str) -> Response {
        self.client
            .get(format!("{}/v1/media/{}", self.base_url, id))
            .send()
            .await
            .expect("Get media request failed")
    }

    /// PUT /v1/media/{id}
    pub async fn put_media(&self, id: &str, document: &serde_json::Value) -> Response {
        self.client
            .put(format!("{}/v1/media/{}", self.base_url, id))
            .json(document)
            .send()
            .await
            .expect("Put media request failed")
    }

    /// DELETE /v1/media/{id}
    pub async fn delete_media(&self, id: &str) -> Response {
        self.client
            .delete(format!("{}/v1/media/{}", self.base_url, id))
            .send()
            .await
            .expect("Delete media request failed")
    }

    // ========================================================================
    // Jobs Endpoints
    // ========================================================================

    /// GET /v1/jobs
    pub async fn list_jobs(&self) -> Response {
        self.client
            .get(format!("{}/v1/jobs", self.base_url))
            .send()
            .await
            .expect("List jobs request failed")
    }

    /// POST /v1/jobs/{id}/run
    pub async fn run_job(&self, job_id: &str) -> Response {
        self.client
            .post(format!("{}/v1/jobs/{}/run", self.base_url, job_id))
            .send()
            .await
            .expect("Run job request failed")
    }
}
