//! Configuration for the Nexus aggregation store
//!
//! Compile-time defaults live in the const modules below; `StoreConfig`
//! lets the composing application override the watchlist and inject API
//! keys at runtime.

use std::time::Duration;

/// Application metadata
pub mod app {
    /// Application name (used for the config directory)
    pub const NAME: &str = "nexus";
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Nexus/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 30;

    /// Socket read poll interval in milliseconds.
    /// Reader threads wake at this cadence to check their stop flag.
    pub const SOCKET_POLL_MS: u64 = 1000;
}

/// Upstream service endpoints
pub mod endpoints {
    /// Weather API base (current conditions + forecast + air quality)
    pub const WEATHER_API: &str = "https://api.weatherapi.com/v1";

    /// Market data API base
    pub const MARKETS_API: &str = "https://api.coingecko.com/api/v3";

    /// News API base
    pub const NEWS_API: &str = "https://newsdata.io/api/1";

    /// Live price/trade feed base (WebSocket)
    pub const FEED_SOCKET: &str = "wss://ws.coincap.io";
}

/// Default watchlist
pub mod watchlist {
    /// Coin ids fetched by the market snapshot operation
    pub const COINS: &[&str] = &["bitcoin", "ethereum", "cardano", "dogecoin"];

    /// Assets subscribed on the live price feed
    pub const STREAM_ASSETS: &[&str] = &["bitcoin", "ethereum", "cardano"];

    /// Exchange whose trade feed is subscribed
    pub const TRADE_EXCHANGE: &str = "binance";

    /// Cities fetched on every refresh
    pub const CITIES: &[&str] = &["New York", "London", "Tokyo"];

    /// News search term
    pub const NEWS_QUERY: &str = "bitcoin";

    /// Maximum number of news articles kept in state
    pub const MAX_ARTICLES: usize = 5;
}

/// Refresh cadence
pub mod refresh {
    /// Seconds between full refreshes (weather + crypto + news)
    pub const INTERVAL_SECS: u64 = 60;
}

/// Runtime configuration for a [`Store`](crate::store::Store)
///
/// Defaults mirror the const watchlist; callers may swap out any list
/// rather than patching constants.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Weather API key (`WEATHER_API_KEY`)
    pub weather_api_key: String,
    /// News API key (`NEWS_API_KEY`)
    pub news_api_key: String,
    /// Cities refreshed by `refresh_all`
    pub cities: Vec<String>,
    /// Coin ids for market snapshots
    pub coins: Vec<String>,
    /// Assets subscribed on the price feed
    pub stream_assets: Vec<String>,
    /// Exchange for the trade feed
    pub trade_exchange: String,
    /// WebSocket base for both live feeds
    pub feed_socket: String,
    /// Forecast days requested per weather refresh
    pub forecast_days: u32,
    /// News search term
    pub news_query: String,
    /// Full-refresh interval
    pub refresh_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            weather_api_key: String::new(),
            news_api_key: String::new(),
            cities: watchlist::CITIES.iter().map(|s| s.to_string()).collect(),
            coins: watchlist::COINS.iter().map(|s| s.to_string()).collect(),
            stream_assets: watchlist::STREAM_ASSETS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            trade_exchange: watchlist::TRADE_EXCHANGE.to_string(),
            feed_socket: endpoints::FEED_SOCKET.to_string(),
            forecast_days: 1,
            news_query: watchlist::NEWS_QUERY.to_string(),
            refresh_interval: Duration::from_secs(refresh::INTERVAL_SECS),
        }
    }
}

impl StoreConfig {
    /// Build a config with API keys taken from the environment
    ///
    /// Missing variables leave the keys empty; the providers still issue
    /// requests and the upstream rejection surfaces in the logs.
    pub fn from_env() -> Self {
        Self {
            weather_api_key: std::env::var("WEATHER_API_KEY").unwrap_or_default(),
            news_api_key: std::env::var("NEWS_API_KEY").unwrap_or_default(),
            ..Self::default()
        }
    }
}
