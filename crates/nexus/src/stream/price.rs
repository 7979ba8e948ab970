//! Live price feed
//!
//! Subscribes to the CoinCap prices channel. Each message is a partial
//! map of asset id to price; known assets keep their last price until a
//! new message mentions them again.

use crate::error::{NexusError, Result};
use crate::store::state::DashState;
use crate::stream::FeedHandle;

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// The wire format quotes prices as decimal strings, but a plain number
// is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PriceValue {
    Number(f64),
    Text(String),
}

impl PriceValue {
    fn to_f64(&self) -> Result<f64> {
        match self {
            PriceValue::Number(n) => Ok(*n),
            PriceValue::Text(s) => s
                .parse::<f64>()
                .map_err(|_| NexusError::Decode(format!("bad price value: {:?}", s))),
        }
    }
}

/// Merge one prices message into the live price map
///
/// The whole message is decoded before any price is applied, so a
/// malformed message leaves the map untouched.
pub(crate) fn apply_price_message(state: &Mutex<DashState>, text: &str) -> Result<()> {
    let raw: HashMap<String, PriceValue> = serde_json::from_str(text)
        .map_err(|e| NexusError::Decode(format!("bad prices message: {}", e)))?;

    let mut parsed = HashMap::with_capacity(raw.len());
    for (asset, value) in &raw {
        parsed.insert(asset.clone(), value.to_f64()?);
    }

    let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
    state.live_prices.extend(parsed);
    Ok(())
}

/// Start the price feed reader for the given asset ids
pub fn spawn_price_feed(
    state: Arc<Mutex<DashState>>,
    base: &str,
    assets: &[String],
) -> Result<FeedHandle> {
    let url = format!("{}/prices?assets={}", base, assets.join(","));
    super::spawn_reader("prices", url, move |text| {
        apply_price_message(&state, text)
    })
}
