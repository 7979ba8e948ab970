//! Live trade feed
//!
//! Subscribes to the CoinCap trades channel for one exchange. The store
//! keeps only the most recent trade per base asset; every message for a
//! base replaces the previous record wholesale.

use crate::error::{NexusError, Result};
use crate::store::state::{DashState, TradeRecord};
use crate::stream::FeedHandle;

use serde::Deserialize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Deserialize)]
struct TradeMessage {
    base: String,
    #[serde(rename = "priceUsd")]
    price_usd: f64,
    volume: f64,
    direction: String,
    timestamp: u64,
}

/// Record one trade message, overwriting any prior trade for its base
pub(crate) fn apply_trade_message(state: &Mutex<DashState>, text: &str) -> Result<()> {
    let message: TradeMessage = serde_json::from_str(text)
        .map_err(|e| NexusError::Decode(format!("bad trade message: {}", e)))?;

    let record = TradeRecord {
        price: message.price_usd,
        volume: message.volume,
        direction: message.direction,
        timestamp: message.timestamp,
    };

    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
    state.trades.insert(message.base, record);
    Ok(())
}

/// Start the trade feed reader for the given exchange
pub fn spawn_trade_feed(
    state: Arc<Mutex<DashState>>,
    base: &str,
    exchange: &str,
) -> Result<FeedHandle> {
    let url = format!("{}/trades/{}", base, exchange);
    super::spawn_reader("trades", url, move |text| {
        apply_trade_message(&state, text)
    })
}
