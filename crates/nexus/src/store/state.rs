//! Dashboard state and record types
//!
//! Display-shaped records the store keeps in memory, plus the aggregate
//! `DashState` shared between the store, the live feeds, and the refresher.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// =============================================================================
// Weather
// =============================================================================

/// A condition descriptor (text + provider icon URL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

/// Current-conditions summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentMain {
    /// Temperature in °C
    pub temp: f64,
    /// Relative humidity in percent
    pub humidity: f64,
    /// Apparent temperature in °C
    pub feels_like: f64,
}

/// Wind summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Wind {
    /// Speed in km/h
    pub speed: f64,
    /// Direction in degrees
    pub deg: f64,
    /// Compass direction (e.g. "NNW")
    pub dir: String,
}

/// One forecast hour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyPoint {
    pub time: String,
    pub temp: f64,
    pub condition: Condition,
    pub wind_speed: f64,
    pub humidity: f64,
    pub rain_chance: f64,
}

/// One forecast day with its hourly breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: String,
    pub max_temp: f64,
    pub min_temp: f64,
    pub avg_temp: f64,
    pub condition: Condition,
    pub humidity: f64,
    pub rain_chance: f64,
    pub hourly: Vec<HourlyPoint>,
}

/// Normalized per-city weather record
///
/// `weather` mirrors the display shape: a one-element list holding the
/// current condition. `air_quality` keeps the provider's pollutant map
/// as-is (keys like `pm2_5`, `us-epa-index`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub main: CurrentMain,
    pub weather: Vec<CurrentCondition>,
    pub wind: Wind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub air_quality: Option<BTreeMap<String, f64>>,
    pub forecast: Vec<ForecastDay>,
}

/// Current condition entry (`main` = condition text)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CurrentCondition {
    pub main: String,
    pub icon: String,
}

// =============================================================================
// Crypto markets
// =============================================================================

/// Raw market snapshot for one coin, kept as the provider reports it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinSnapshot {
    pub id: String,
    pub name: String,
    pub symbol: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub market_cap: f64,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub total_volume: f64,
    #[serde(default)]
    pub high_24h: Option<f64>,
    #[serde(default)]
    pub low_24h: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub max_supply: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub ath: Option<f64>,
    #[serde(default)]
    pub ath_date: Option<String>,
    #[serde(default)]
    pub ath_change_percentage: Option<f64>,
    #[serde(default)]
    pub atl: Option<f64>,
    #[serde(default)]
    pub atl_date: Option<String>,
    #[serde(default)]
    pub atl_change_percentage: Option<f64>,
}

/// Last-known trade event for one base asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub price: f64,
    pub volume: f64,
    /// "buy" or "sell"
    pub direction: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

// =============================================================================
// News
// =============================================================================

/// One news article
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: String,
    #[serde(default, rename = "pubDate")]
    pub pub_date: Option<String>,
}

// =============================================================================
// Aggregate state
// =============================================================================

/// All dashboard collections, owned by the store
///
/// Consumers receive clones; only store operations mutate this.
#[derive(Debug, Clone, Default)]
pub struct DashState {
    /// Per-city weather, keyed by the requested city name
    pub weather: HashMap<String, WeatherRecord>,
    /// Market snapshots keyed by coin id; replaced wholesale per fetch
    pub crypto: HashMap<String, CoinSnapshot>,
    /// Latest articles, capped, in provider order
    pub news: Vec<NewsArticle>,
    /// Streamed last-known price per asset id
    pub live_prices: HashMap<String, f64>,
    /// Streamed last-known trade per base asset
    pub trades: HashMap<String, TradeRecord>,
}
