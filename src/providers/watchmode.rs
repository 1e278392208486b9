//! Watchmode client for per-title streaming availability.

use reqwest::blocking::Client;
use std::time::Duration;

use super::StreamingSourceProvider;
use crate::store::{SourceKind, StreamingSource};
use crate::sync::SyncError;

const WATCHMODE_API_BASE: &str = "https://api.watchmode.com";

pub struct WatchmodeClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl WatchmodeClient {
    pub fn new(api_key: &str) -> Result<Self, SyncError> {
        Self::with_api_base(api_key, WATCHMODE_API_BASE)
    }

    pub fn with_api_base(api_key: &str, api_base: &str) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }
}

impl StreamingSourceProvider for WatchmodeClient {
    fn streaming_sources(&self, external_id: &str) -> Result<Vec<StreamingSource>, SyncError> {
        let url = format!("{}/v1/title/{}/sources/", self.api_base, external_id);
        let response = self
            .client
            .get(url)
            .query(&[("apiKey", self.api_key.as_str()), ("regions", "US")])
            .send()?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(SyncError::RateLimited);
        }
        if !status.is_success() {
            return Err(SyncError::Upstream {
                service: "watchmode",
                status: status.as_u16(),
            });
        }

        let sources: Vec<StreamingSource> = response.json()?;
        Ok(sources
            .into_iter()
            .filter(|source| matches!(source.kind, SourceKind::Sub | SourceKind::Free))
            .collect())
    }
}
