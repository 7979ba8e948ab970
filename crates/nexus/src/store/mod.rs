//! The aggregation store
//!
//! One `Store` owns the shared dashboard state and everything that feeds
//! it: the three REST providers, the two live websocket feeds, and the
//! persisted favorites. Fetch operations never fail the caller; upstream
//! errors are logged and the affected slice of state is left as it was.

pub mod refresh;
pub mod state;

use crate::config::{watchlist, StoreConfig};
use crate::data::{FavoriteKind, Favorites, FavoritesBook};
use crate::error::Result;
use crate::providers::{MarketProvider, NewsProvider, WeatherProvider};
use crate::store::state::{CoinSnapshot, DashState, NewsArticle, TradeRecord, WeatherRecord};
use crate::stream::{spawn_price_feed, spawn_trade_feed, FeedHandle};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

pub use refresh::Refresher;

struct LiveFeeds {
    prices: Option<FeedHandle>,
    trades: Option<FeedHandle>,
}

/// Client-side aggregation store for the dashboard
pub struct Store {
    state: Arc<Mutex<DashState>>,
    weather: WeatherProvider,
    markets: MarketProvider,
    news: NewsProvider,
    favorites: Mutex<FavoritesBook>,
    feeds: Mutex<Option<LiveFeeds>>,
    config: StoreConfig,
}

impl Store {
    /// Create a store with favorites loaded from the default location
    pub fn new(config: StoreConfig) -> Result<Self> {
        let favorites = FavoritesBook::load()?;
        Self::build(config, favorites)
    }

    /// Create a store with favorites backed by a specific file
    pub fn with_favorites_path(config: StoreConfig, path: std::path::PathBuf) -> Result<Self> {
        Self::build(config, FavoritesBook::load_from(path))
    }

    fn build(config: StoreConfig, favorites: FavoritesBook) -> Result<Self> {
        Ok(Self {
            state: Arc::new(Mutex::new(DashState::default())),
            weather: WeatherProvider::new(config.weather_api_key.clone())?,
            markets: MarketProvider::new()?,
            news: NewsProvider::new(config.news_api_key.clone())?,
            favorites: Mutex::new(favorites),
            feeds: Mutex::new(None),
            config,
        })
    }

    /// The runtime configuration this store was built with
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn lock_state(&self) -> MutexGuard<'_, DashState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Fetch operations
    // =========================================================================

    /// Fetch and record an N-day forecast for one city
    ///
    /// On failure the city's existing record is kept and the error only
    /// reaches the logs.
    pub fn fetch_weather(&self, city: &str, days: u32) {
        self.fetch_weather_at(city, days, None, None);
    }

    /// Fetch weather for one city, optionally pinned to a date and hour
    pub fn fetch_weather_at(&self, city: &str, days: u32, dt: Option<&str>, hour: Option<u32>) {
        match self.weather.forecast(city, days, dt, hour) {
            Ok(record) => self.apply_weather(city, record),
            Err(e) => tracing::warn!("weather fetch failed for {}: {}", city, e),
        }
    }

    /// Fetch market snapshots for the configured coins
    ///
    /// On success the crypto map is replaced wholesale; on failure the
    /// previous snapshots are kept.
    pub fn fetch_crypto(&self) {
        match self.markets.markets(&self.config.coins) {
            Ok(snapshots) => self.apply_crypto(snapshots),
            Err(e) => tracing::warn!("crypto fetch failed: {}", e),
        }
    }

    /// Fetch the latest articles for the configured query
    pub fn fetch_news(&self) {
        match self.news.articles(&self.config.news_query) {
            Ok(articles) => self.apply_news(articles),
            Err(e) => tracing::warn!("news fetch failed: {}", e),
        }
    }

    /// Run one full refresh: every configured city, the coin list, and news
    pub fn refresh_all(&self) {
        for city in self.config.cities.clone() {
            self.fetch_weather(&city, self.config.forecast_days);
        }
        self.fetch_crypto();
        self.fetch_news();
    }

    // =========================================================================
    // State application (merge semantics)
    // =========================================================================

    /// Merge one city's record into the weather map
    pub(crate) fn apply_weather(&self, city: &str, record: WeatherRecord) {
        let mut state = self.lock_state();
        state.weather.insert(city.to_string(), record);
    }

    /// Replace the crypto map with a fresh set of snapshots
    pub(crate) fn apply_crypto(&self, snapshots: Vec<CoinSnapshot>) {
        let map: HashMap<String, CoinSnapshot> =
            snapshots.into_iter().map(|c| (c.id.clone(), c)).collect();
        let mut state = self.lock_state();
        state.crypto = map;
    }

    /// Replace the news list, keeping at most the configured cap
    pub(crate) fn apply_news(&self, mut articles: Vec<NewsArticle>) {
        articles.truncate(watchlist::MAX_ARTICLES);
        let mut state = self.lock_state();
        state.news = articles;
    }

    // =========================================================================
    // State access
    // =========================================================================

    /// Clone the full dashboard state
    pub fn snapshot(&self) -> DashState {
        self.lock_state().clone()
    }

    /// Clone one city's weather record, if present
    pub fn weather_for(&self, city: &str) -> Option<WeatherRecord> {
        self.lock_state().weather.get(city).cloned()
    }

    /// Clone one coin's market snapshot, if present
    pub fn coin(&self, id: &str) -> Option<CoinSnapshot> {
        self.lock_state().crypto.get(id).cloned()
    }

    /// Streamed last-known price for an asset, if any message named it yet
    pub fn live_price(&self, asset: &str) -> Option<f64> {
        self.lock_state().live_prices.get(asset).copied()
    }

    /// Streamed last-known trade for a base asset
    pub fn trade(&self, base: &str) -> Option<TradeRecord> {
        self.lock_state().trades.get(base).cloned()
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// Add a favorite, persisting the change
    ///
    /// Persistence failures are logged; the in-memory list is updated
    /// either way. Returns whether the list changed.
    pub fn add_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        let mut book = self.favorites.lock().unwrap_or_else(|e| e.into_inner());
        match book.add(kind, id) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("failed to persist favorites: {}", e);
                true
            }
        }
    }

    /// Remove a favorite, persisting the change
    pub fn remove_favorite(&self, kind: FavoriteKind, id: &str) -> bool {
        let mut book = self.favorites.lock().unwrap_or_else(|e| e.into_inner());
        match book.remove(kind, id) {
            Ok(changed) => changed,
            Err(e) => {
                tracing::warn!("failed to persist favorites: {}", e);
                true
            }
        }
    }

    /// Clone the current favorites lists
    pub fn favorites(&self) -> Favorites {
        self.favorites
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .favorites()
            .clone()
    }

    // =========================================================================
    // Live feeds
    // =========================================================================

    /// Start both websocket feeds
    ///
    /// A feed that fails to connect is logged and skipped; the other feed
    /// still runs. Calling this while feeds are already running is a no-op.
    pub fn start_live_feeds(&self) {
        let mut feeds = self.feeds.lock().unwrap_or_else(|e| e.into_inner());
        if feeds.is_some() {
            tracing::debug!("live feeds already running");
            return;
        }

        let prices = match spawn_price_feed(
            Arc::clone(&self.state),
            &self.config.feed_socket,
            &self.config.stream_assets,
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("price feed unavailable: {}", e);
                None
            }
        };
        let trades = match spawn_trade_feed(
            Arc::clone(&self.state),
            &self.config.feed_socket,
            &self.config.trade_exchange,
        ) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("trade feed unavailable: {}", e);
                None
            }
        };

        // With nothing connected there is nothing running; leave the slot
        // empty so a later start can try again.
        if prices.is_none() && trades.is_none() {
            tracing::warn!("no live feed could be started");
            return;
        }

        *feeds = Some(LiveFeeds { prices, trades });
    }

    /// Stop both websocket feeds and join their threads
    ///
    /// Safe to call when feeds were never started, and safe to call twice.
    /// Prices and trades already recorded stay in state.
    pub fn close_live_feeds(&self) {
        let taken = self
            .feeds
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(mut feeds) = taken {
            if let Some(handle) = feeds.prices.as_mut() {
                handle.stop();
            }
            if let Some(handle) = feeds.trades.as_mut() {
                handle.stop();
            }
        }
    }
}

// Dropping the store drops any running `FeedHandle`s, which stop and
// join their reader threads.

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::state::{CurrentCondition, CurrentMain, Wind};
    use std::env::temp_dir;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn test_store(config: StoreConfig) -> Store {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = temp_dir().join(format!("nexus_store_test_{}.json", id));
        let _ = std::fs::remove_file(&path);
        Store::with_favorites_path(config, path).unwrap()
    }

    fn record(temp: f64) -> WeatherRecord {
        WeatherRecord {
            main: CurrentMain {
                temp,
                humidity: 50.0,
                feels_like: temp,
            },
            weather: vec![CurrentCondition::default()],
            wind: Wind::default(),
            air_quality: None,
            forecast: vec![],
        }
    }

    fn coin(id: &str, price: f64) -> CoinSnapshot {
        serde_json::from_str(&format!(
            r#"{{"id": "{id}", "name": "{id}", "symbol": "{id}", "current_price": {price}}}"#
        ))
        .unwrap()
    }

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            description: None,
            link: String::new(),
            pub_date: None,
        }
    }

    // ---- merge semantics ----

    #[test]
    fn test_weather_merges_per_city() {
        let store = test_store(StoreConfig::default());
        store.apply_weather("Tokyo", record(18.0));
        store.apply_weather("London", record(9.0));

        let state = store.snapshot();
        assert_eq!(state.weather.len(), 2);
        assert_eq!(state.weather["Tokyo"].main.temp, 18.0);
        assert_eq!(state.weather["London"].main.temp, 9.0);
    }

    #[test]
    fn test_weather_refetch_replaces_only_that_city() {
        let store = test_store(StoreConfig::default());
        store.apply_weather("Tokyo", record(18.0));
        store.apply_weather("London", record(9.0));
        store.apply_weather("Tokyo", record(21.0));

        let state = store.snapshot();
        assert_eq!(state.weather["Tokyo"].main.temp, 21.0);
        assert_eq!(state.weather["London"].main.temp, 9.0);
    }

    #[test]
    fn test_crypto_replaced_wholesale() {
        let store = test_store(StoreConfig::default());
        store.apply_crypto(vec![coin("bitcoin", 67000.0), coin("dogecoin", 0.1)]);
        store.apply_crypto(vec![coin("bitcoin", 68000.0)]);

        let state = store.snapshot();
        assert_eq!(state.crypto.len(), 1);
        assert_eq!(state.crypto["bitcoin"].current_price, 68000.0);
        assert!(!state.crypto.contains_key("dogecoin"));
    }

    #[test]
    fn test_news_capped_and_replaced() {
        let store = test_store(StoreConfig::default());
        store.apply_news((0..8).map(|i| article(&format!("old {}", i))).collect());
        let state = store.snapshot();
        assert_eq!(state.news.len(), 5);
        assert_eq!(state.news[0].title, "old 0");

        store.apply_news(vec![article("fresh")]);
        let state = store.snapshot();
        assert_eq!(state.news.len(), 1);
        assert_eq!(state.news[0].title, "fresh");
    }

    // ---- failure isolation ----

    #[test]
    fn test_fetch_failures_leave_state_untouched() {
        // Keys are empty and no test network exists, so every fetch fails;
        // previously applied data must survive all of them.
        let config = StoreConfig {
            cities: vec!["Tokyo".to_string()],
            ..StoreConfig::default()
        };
        let store = test_store(config);
        store.apply_weather("Tokyo", record(18.0));
        store.apply_crypto(vec![coin("bitcoin", 67000.0)]);
        store.apply_news(vec![article("kept")]);

        // Point the providers nowhere reachable
        let store = Store {
            weather: WeatherProvider::with_base_url("k", "http://invalid.invalid.invalid").unwrap(),
            markets: MarketProvider::with_base_url("http://invalid.invalid.invalid").unwrap(),
            news: NewsProvider::with_base_url("k", "http://invalid.invalid.invalid").unwrap(),
            ..store
        };

        store.refresh_all();

        let state = store.snapshot();
        assert_eq!(state.weather["Tokyo"].main.temp, 18.0);
        assert_eq!(state.crypto["bitcoin"].current_price, 67000.0);
        assert_eq!(state.news[0].title, "kept");
    }

    #[test]
    fn test_fetch_weather_takes_caller_day_count() {
        // Caller-supplied days must not depend on the config default; with
        // no reachable provider the fetch fails quietly either way.
        let store = test_store(StoreConfig {
            forecast_days: 1,
            ..StoreConfig::default()
        });
        store.apply_weather("Paris", record(12.0));

        let store = Store {
            weather: WeatherProvider::with_base_url("k", "http://invalid.invalid.invalid").unwrap(),
            ..store
        };
        store.fetch_weather("Paris", 3);

        assert_eq!(store.weather_for("Paris").unwrap().main.temp, 12.0);
    }

    // ---- favorites ----

    #[test]
    fn test_add_favorite_idempotent() {
        let store = test_store(StoreConfig::default());
        assert!(store.add_favorite(FavoriteKind::Cities, "Tokyo"));
        assert!(!store.add_favorite(FavoriteKind::Cities, "Tokyo"));
        assert_eq!(store.favorites().cities.len(), 1);
    }

    #[test]
    fn test_remove_favorite_symmetry() {
        let store = test_store(StoreConfig::default());
        store.add_favorite(FavoriteKind::Cryptos, "bitcoin");
        assert!(store.remove_favorite(FavoriteKind::Cryptos, "bitcoin"));
        assert!(!store.remove_favorite(FavoriteKind::Cryptos, "bitcoin"));
        assert!(store.favorites().cryptos.is_empty());
    }

    #[test]
    fn test_favorites_lists_independent() {
        let store = test_store(StoreConfig::default());
        store.add_favorite(FavoriteKind::Cities, "bitcoin");
        store.add_favorite(FavoriteKind::Cryptos, "bitcoin");
        store.remove_favorite(FavoriteKind::Cities, "bitcoin");

        let favorites = store.favorites();
        assert!(favorites.cities.is_empty());
        assert!(favorites.cryptos.contains("bitcoin"));
    }

    // ---- live feed teardown ----

    #[test]
    fn test_close_without_start_is_safe() {
        let store = test_store(StoreConfig::default());
        store.close_live_feeds();
        store.close_live_feeds();
    }

    #[test]
    fn test_failed_start_leaves_feeds_stopped() {
        // Nothing listens on this port, so both connects are refused; the
        // store must not consider the feeds running afterwards, and a
        // second start must be allowed to try again.
        let config = StoreConfig {
            feed_socket: "ws://127.0.0.1:1".to_string(),
            ..StoreConfig::default()
        };
        let store = test_store(config);

        store.start_live_feeds();
        assert!(store.feeds.lock().unwrap().is_none());

        store.start_live_feeds();
        assert!(store.feeds.lock().unwrap().is_none());

        store.close_live_feeds();
    }

    #[test]
    fn test_close_keeps_streamed_data() {
        let store = test_store(StoreConfig::default());
        {
            let mut state = store.lock_state();
            state.live_prices.insert("bitcoin".to_string(), 67000.0);
        }
        store.close_live_feeds();
        assert_eq!(store.live_price("bitcoin"), Some(67000.0));
    }

    // ---- accessors ----

    #[test]
    fn test_accessors_return_clones() {
        let store = test_store(StoreConfig::default());
        store.apply_weather("Tokyo", record(18.0));
        store.apply_crypto(vec![coin("bitcoin", 67000.0)]);

        assert_eq!(store.weather_for("Tokyo").unwrap().main.temp, 18.0);
        assert_eq!(store.coin("bitcoin").unwrap().current_price, 67000.0);
        assert_eq!(store.weather_for("Nowhere"), None);
        assert_eq!(store.live_price("bitcoin"), None);
        assert_eq!(store.trade("bitcoin"), None);
    }
}
