//! Upstream data providers
//!
//! One client per data domain: weather forecasts, coin market snapshots,
//! and news articles. Each provider decodes the wire format and hands the
//! store display-shaped records; the store decides how results merge.

pub mod markets;
pub mod news;
pub mod weather;

// Re-exports
pub use markets::MarketProvider;
pub use news::NewsProvider;
pub use weather::WeatherProvider;
