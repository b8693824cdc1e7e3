//! Recent search history
//!
//! Successful searches are remembered most-recent-first, without duplicates
//! (compared case-insensitively), capped at ten.

use std::sync::Arc;

use tracing::warn;

use crate::storage::{Storage, StorageError};

/// Storage key for the recent searches list
pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

/// Maximum number of remembered searches
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Persisted list of recent searches
pub struct RecentSearches {
    storage: Arc<dyn Storage>,
}

impl RecentSearches {
    /// Creates a history backed by `storage`
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    /// Returns the remembered searches, most recent first
    ///
    /// Unreadable history is treated as empty.
    pub fn list(&self) -> Vec<String> {
        let bytes = match self.storage.get(RECENT_SEARCHES_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read recent searches: {}", e);
                return Vec::new();
            }
        };
        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("Corrupt recent searches, starting over: {}", e);
            Vec::new()
        })
    }

    /// Records `query` as the most recent search and returns the new list
    ///
    /// Blank queries are ignored.
    pub fn add(&self, query: &str) -> Vec<String> {
        let query = query.trim();
        let mut searches = self.list();
        if query.is_empty() {
            return searches;
        }

        let lowered = query.to_lowercase();
        searches.retain(|existing| existing.to_lowercase() != lowered);
        searches.insert(0, query.to_string());
        searches.truncate(MAX_RECENT_SEARCHES);

        self.save(&searches);
        searches
    }

    /// Forgets all searches
    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(RECENT_SEARCHES_KEY) {
            warn!("Failed to clear recent searches: {}", e);
        }
    }

    fn save(&self, searches: &[String]) {
        let result = serde_json::to_vec(searches)
            .map_err(StorageError::from)
            .and_then(|bytes| self.storage.set(RECENT_SEARCHES_KEY, &bytes));
        if let Err(e) = result {
            warn!("Failed to save recent searches: {}", e);
        }
    }
}
