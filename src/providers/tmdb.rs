//! TMDB client, used as the fallback for IMDb id lookups.
//!
//! The lookup is a two-step dance: search for the film, then read the top
//! result's external ids.

use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

use super::ImdbResolver;
use crate::sync::SyncError;

const TMDB_API_BASE: &str = "https://api.themoviedb.org";

pub struct TmdbClient {
    client: Client,
    api_base: String,
    access_token: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    id: i64,
}

#[derive(Deserialize)]
struct ExternalIdsResponse {
    imdb_id: Option<String>,
}

impl TmdbClient {
    pub fn new(access_token: &str) -> Result<Self, SyncError> {
        Self::with_api_base(access_token, TMDB_API_BASE)
    }

    pub fn with_api_base(access_token: &str, api_base: &str) -> Result<Self, SyncError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }
}

impl ImdbResolver for TmdbClient {
    fn provider_name(&self) -> &'static str {
        "tmdb"
    }

    fn resolve_imdb_id(
        &self,
        title: &str,
        year: Option<i32>,
    ) -> Result<Option<String>, SyncError> {
        let mut query: Vec<(&str, String)> = vec![
            ("query", title.to_string()),
            ("language", "en-US".to_string()),
            ("page", "1".to_string()),
        ];
        if let Some(year) = year {
            query.push(("primary_release_year", year.to_string()));
        }

        let response = self
            .client
            .get(format!("{}/3/search/movie", self.api_base))
            .bearer_auth(&self.access_token)
            .query(&query)
            .send()?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body: SearchResponse = response.json()?;
        let top_result = match body.results.into_iter().next() {
            Some(result) => result,
            None => return Ok(None),
        };

        let response = self
            .client
            .get(format!(
                "{}/3/movie/{}/external_ids",
                self.api_base, top_result.id
            ))
            .bearer_auth(&self.access_token)
            .send()?;
        if !response.status().is_success() {
            return Ok(None);
        }

        let body: ExternalIdsResponse = response.json()?;
        Ok(body.imdb_id.filter(|id| !id.is_empty()))
    }
}
