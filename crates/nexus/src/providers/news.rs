//! News provider
//!
//! Fetches English-language articles matching a query term from a
//! newsdata.io-compatible endpoint.

use crate::config::endpoints::NEWS_API;
use crate::error::Result;
use crate::network::HttpClient;
use crate::store::state::NewsArticle;

use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    results: Vec<NewsArticle>,
}

/// News API client
pub struct NewsProvider {
    client: HttpClient,
    base_url: String,
    api_key: String,
}

impl NewsProvider {
    /// Create a provider against the default server
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: NEWS_API.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Create a provider with a custom base URL (for testing or mirrors)
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Fetch articles matching the query, in provider order
    pub fn articles(&self, query: &str) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/news", self.base_url);
        let response: NewsResponse = self.client.get_json_query(
            &url,
            &[
                ("apikey", self.api_key.as_str()),
                ("q", query),
                ("language", "en"),
            ],
        )?;
        Ok(response.results)
    }
}
