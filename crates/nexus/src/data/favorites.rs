//! Favorites persistence
//!
//! User-pinned cities and coins, kept in a JSON file under the config
//! directory and rewritten after every mutation.

use crate::data::storage;
use crate::error::Result;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

const FAVORITES_FILE: &str = "favorites.json";

/// Which favorites list an id belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteKind {
    Cities,
    Cryptos,
}

/// The persisted favorites document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorites {
    #[serde(default)]
    pub cities: BTreeSet<String>,
    #[serde(default)]
    pub cryptos: BTreeSet<String>,
}

impl Favorites {
    fn set_mut(&mut self, kind: FavoriteKind) -> &mut BTreeSet<String> {
        match kind {
            FavoriteKind::Cities => &mut self.cities,
            FavoriteKind::Cryptos => &mut self.cryptos,
        }
    }

    pub fn contains(&self, kind: FavoriteKind, id: &str) -> bool {
        match kind {
            FavoriteKind::Cities => self.cities.contains(id),
            FavoriteKind::Cryptos => self.cryptos.contains(id),
        }
    }
}

/// Manages the favorites lists and their backing file
pub struct FavoritesBook {
    favorites: Favorites,
    path: PathBuf,
}

impl FavoritesBook {
    /// Load favorites from the default config location
    pub fn load() -> Result<Self> {
        let path = storage::data_path(FAVORITES_FILE)?;
        Ok(Self::load_from(path))
    }

    /// Load favorites from a specific file path
    ///
    /// A missing, empty, or unreadable file yields empty lists; a corrupt
    /// file is logged and likewise falls back to empty lists rather than
    /// failing startup.
    pub fn load_from(path: PathBuf) -> Self {
        let favorites = match storage::load_from(&path) {
            Ok(Some(favorites)) => favorites,
            Ok(None) => Favorites::default(),
            Err(e) => {
                tracing::warn!("failed to load favorites from {:?}: {}", path, e);
                Favorites::default()
            }
        };
        Self { favorites, path }
    }

    /// Current favorites snapshot
    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    /// Add an id to a favorites list
    ///
    /// Adding an id that is already present is a no-op and does not touch
    /// the backing file. Returns whether the list changed.
    pub fn add(&mut self, kind: FavoriteKind, id: &str) -> Result<bool> {
        if !self.favorites.set_mut(kind).insert(id.to_string()) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    /// Remove an id from a favorites list
    ///
    /// Removing an absent id is a no-op and does not touch the backing
    /// file. Returns whether the list changed.
    pub fn remove(&mut self, kind: FavoriteKind, id: &str) -> Result<bool> {
        if !self.favorites.set_mut(kind).remove(id) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    fn save(&self) -> Result<()> {
        storage::save_to(&self.path, &self.favorites)
    }
}
