//! OMDb client, used as the first stop for IMDb id lookups.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::ImdbResolver;
use crate::sync::SyncError;

const OMDB_API_BASE: &str = "https://www.omdbapi.com";

pub struct OmdbClient {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Deserialize)]
struct OmdbResponse {
    #[serde(rename = "Response", default)]
    response: String,
    #[serde(rename = "imdbID")]
    imdb_id: Option<String>,
}

impl OmdbClient {
    pub fn new(api_key: &str) -> Result<Self, SyncError> {
        Self::with_api_base(api_key, OMDB_API_BASE)
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

impl ImdbResolver for OmdbClient {
    fn provider_name(&self) -> &'static str {
        "omdb"
    }

    fn resolve_imdb_id(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<String>, SyncError> {
        let mut query: Vec<(&str, String)> = vec![
            ("apikey", self.api_key.clone()),
            ("t", title.to_string()),
            ("type", "movie".to_string()),
        ];
        if let Some(year) = year {
            query.push(("y", year.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/", self.api_base))
            .query(&query)
            .send()?;
        if !response.status().is_success() {
            // Treated as "no answer" so the next resolver gets a go.
            return Ok(None);
        }

        let body: OmdbResponse = response.json()?;
        if body.response == "True" {
            Ok(body.imdb_id.filter(|id| !id.is_empty()))
        } else {
            Ok(None)
        }
    }
}
