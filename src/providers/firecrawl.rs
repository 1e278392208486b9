//! Firecrawl client that renders a target page to markdown.

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::CatalogSource;
use crate::sync::SyncError;

const FIRECRAWL_API_BASE: &str = "https://api.firecrawl.dev";
// The catalog page is render-heavy, so the scrape gets a generous time
// allowance and the HTTP timeout sits above it.
const SCRAPE_TIMEOUT_MS: u64 = 120_000;
const HTTP_TIMEOUT: Duration = Duration::from_secs(150);

pub struct FirecrawlScraper {
    client: Client,
    api_base: String,
    api_key: String,
    target_url: String,
}

#[derive(Serialize)]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'a str; 1],
    #[serde(rename = "onlyMainContent")]
    only_main_content: bool,
    timeout: u64,
}

#[derive(Deserialize)]
struct ScrapeResponse {
    data: Option<ScrapeData>,
    markdown: Option<String>,
}

#[derive(Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
}

impl FirecrawlScraper {
    pub fn new(api_key: &str, target_url: &str) -> Result<Self, SyncError> {
        Self::with_api_base(api_key, target_url, FIRECRAWL_API_BASE)
    }

    pub fn with_api_base(
        api_key: &str,
        target_url: &str,
        api_base: &str,
    ) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            target_url: target_url.to_string(),
        })
    }
}

impl CatalogSource for FirecrawlScraper {
    fn fetch_markdown(&self) -> Result<String, SyncError> {
        let request = ScrapeRequest {
            url: &self.target_url,
            formats: ["markdown"],
            only_main_content: false,
            timeout: SCRAPE_TIMEOUT_MS,
        };

        let response = self
            .client
            .post(format!("{}/v1/scrape", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Upstream {
                service: "firecrawl",
                status: status.as_u16(),
            });
        }

        // Newer API versions nest the document under `data`, older ones
        // return it at the top level.
        let body: ScrapeResponse = response.json()?;
        Ok(body
            .data
            .and_then(|data| data.markdown)
            .or(body.markdown)
            .unwrap_or_default())
    }
}
