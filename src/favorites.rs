//! Saved favorite verses
//!
//! Favorites are unique by reference and stored as one JSON list. Unlike the
//! verse cache, write failures here are returned to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::data::VerseResponse;
use crate::storage::{Storage, StorageError};

/// Storage key for the favorites list
pub const FAVORITES_KEY: &str = "favorites";

/// A verse the user chose to keep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteVerse {
    /// Reference as returned by the API, e.g. "John 3:16"
    pub reference: String,
    /// Passage text, trimmed
    pub text: String,
    /// Book of the first verse
    pub book_name: String,
    /// Chapter of the first verse
    pub chapter: u32,
    /// Number of the first verse
    pub verse: u32,
    /// Translation the text is in
    pub translation_name: String,
    /// When it was saved
    pub saved_at: DateTime<Utc>,
}

impl FavoriteVerse {
    /// Builds a favorite from a fetched passage
    pub fn from_response(response: &VerseResponse, saved_at: DateTime<Utc>) -> Self {
        let first = response.verses.first();
        Self {
            reference: response.reference.clone(),
            text: response.text.trim().to_string(),
            book_name: first.map(|v| v.book_name.clone()).unwrap_or_default(),
            chapter: first.map(|v| v.chapter).unwrap_or(0),
            verse: first.map(|v| v.verse).unwrap_or(0),
            translation_name: response.translation_name.clone(),
            saved_at,
        }
    }
}

/// Persisted set of favorite verses
pub struct Favorites {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
}

impl Favorites {
    /// Creates a favorites list backed by `storage`
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self { storage, clock }
    }

    /// All favorites, most recently saved first
    pub fn list(&self) -> Vec<FavoriteVerse> {
        let mut favorites = self.load();
        favorites.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        favorites
    }

    /// Whether `reference` is saved (exact match on the API reference)
    pub fn contains(&self, reference: &str) -> bool {
        self.load().iter().any(|f| f.reference == reference)
    }

    /// Saves `response`; returns false if its reference was already saved
    pub fn add(&self, response: &VerseResponse) -> Result<bool, StorageError> {
        let mut favorites = self.load();
        if favorites.iter().any(|f| f.reference == response.reference) {
            return Ok(false);
        }
        let saved_at = self.clock.now().with_timezone(&Utc);
        favorites.push(FavoriteVerse::from_response(response, saved_at));
        self.save(&favorites)?;
        Ok(true)
    }

    /// Removes the favorite with `reference`; returns false if there was none
    pub fn remove(&self, reference: &str) -> Result<bool, StorageError> {
        let mut favorites = self.load();
        let before = favorites.len();
        favorites.retain(|f| f.reference != reference);
        if favorites.len() == before {
            return Ok(false);
        }
        self.save(&favorites)?;
        Ok(true)
    }

    /// Adds or removes `response`; returns whether it is saved afterwards
    pub fn toggle(&self, response: &VerseResponse) -> Result<bool, StorageError> {
        if self.remove(&response.reference)? {
            Ok(false)
        } else {
            self.add(response)
        }
    }

    fn load(&self) -> Vec<FavoriteVerse> {
        let bytes = match self.storage.get(FAVORITES_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read favorites: {}", e);
                return Vec::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Corrupt favorites data, ignoring: {}", e);
            Vec::new()
        })
    }

    fn save(&self, favorites: &[FavoriteVerse]) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(favorites)?;
        self.storage.set(FAVORITES_KEY, &bytes)
    }
}
