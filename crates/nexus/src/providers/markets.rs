//! Market data provider
//!
//! Fetches coin market snapshots from a CoinGecko-compatible endpoint.
//! Snapshots are kept raw; no normalization beyond serde decoding.

use crate::config::endpoints::MARKETS_API;
use crate::error::Result;
use crate::network::HttpClient;
use crate::store::state::CoinSnapshot;

/// Market data client
pub struct MarketProvider {
    client: HttpClient,
    base_url: String,
}

impl MarketProvider {
    /// Create a provider against the default server
    pub fn new() -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: MARKETS_API.to_string(),
        })
    }

    /// Create a provider with a custom base URL (for testing or mirrors)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: HttpClient::new()?,
            base_url: base_url.into(),
        })
    }

    /// Fetch market snapshots for the given coin ids, priced in USD
    pub fn markets(&self, ids: &[String]) -> Result<Vec<CoinSnapshot>> {
        let joined = ids.join(",");
        let url = format!("{}/coins/markets", self.base_url);
        let snapshots: Vec<CoinSnapshot> = self
            .client
            .get_json_query(&url, &[("vs_currency", "usd"), ("ids", &joined)])?;
        Ok(snapshots)
    }
}
