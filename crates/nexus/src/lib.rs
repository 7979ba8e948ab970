//! Nexus — client-side aggregation store for a live dashboard
//!
//! Pulls weather forecasts, coin market snapshots, and news headlines
//! over REST, merges live prices and trades from websocket feeds, and
//! keeps user favorites on disk. All of it lands in one shared
//! [`DashState`](store::state::DashState) behind the [`Store`](store::Store).
//!
//! The store is synchronous and thread-backed: fetches run on whatever
//! thread calls them, the feeds and the [`Refresher`](store::Refresher)
//! own background threads, and consumers read cloned snapshots.

pub mod config;
pub mod data;
pub mod error;
pub mod network;
pub mod providers;
pub mod store;
pub mod stream;

// Re-export the main types at the crate root
pub use config::StoreConfig;
pub use data::{FavoriteKind, Favorites};
pub use error::{NexusError, Result};
pub use store::state::DashState;
pub use store::{Refresher, Store};
