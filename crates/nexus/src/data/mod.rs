//! Data persistence layer

pub mod favorites;
pub mod storage;

// Re-exports
pub use favorites::{FavoriteKind, Favorites, FavoritesBook};
