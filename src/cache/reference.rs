//! Reference lookups with a fixed time-to-live
//!
//! Entries are keyed by the normalized reference only. The translation is not
//! part of the key, so looking up the same reference in another translation
//! after a miss overwrites the earlier entry, and a hit may return a verse in
//! the translation that was cached first. This is the current last-write-wins
//! behavior and is kept deliberately.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::debug;

use super::entry::CacheEntry;
use super::key::normalize_reference;
use super::store::CacheStore;
use crate::clock::Clock;
use crate::data::{FetchError, VerseFetcher, VerseResponse};

/// Time-to-live for reference lookups in hours
pub const REFERENCE_TTL_HOURS: i64 = 24;

/// TTL cache for arbitrary reference lookups
pub struct ReferenceCache {
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl ReferenceCache {
    /// Creates a reference cache with the standard 24 hour TTL
    pub fn new(store: Arc<CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            ttl: Duration::hours(REFERENCE_TTL_HOURS),
        }
    }

    /// Returns the cached passage for `reference` if it has not expired
    pub fn cached(&self, reference: &str) -> Option<VerseResponse> {
        let key = normalize_reference(reference);
        let now = self.clock.now().with_timezone(&Utc);
        self.store
            .get(&key)
            .filter(|entry| entry.is_fresh_at(now))
            .map(|entry| entry.value)
    }

    /// Stores `response` under `reference` for one TTL from now
    pub fn put(&self, reference: &str, response: VerseResponse) {
        let key = normalize_reference(reference);
        let now = self.clock.now().with_timezone(&Utc);
        self.store
            .insert(&key, CacheEntry::with_ttl(response, now, self.ttl));
    }

    /// Returns the passage for `reference`, fetching it on a miss
    ///
    /// # Arguments
    /// * `fetcher` - Remote source consulted only on a miss or expired entry
    /// * `reference` - Human-entered reference, e.g. "John 3:16"
    /// * `translation` - Translation id passed through to the fetcher
    ///
    /// # Returns
    /// * `Ok(VerseResponse)` from the cache or from a successful fetch
    /// * `Err(FetchError)` exactly as the fetcher reported it; nothing is cached
    pub async fn get_or_fetch<F: VerseFetcher>(
        &self,
        fetcher: &F,
        reference: &str,
        translation: &str,
    ) -> Result<VerseResponse, FetchError> {
        let key = normalize_reference(reference);

        if let Some(cached) = self.cached(reference) {
            debug!("Cache hit for {}", key);
            self.store.counters().record_hit();
            return Ok(cached);
        }

        debug!("Cache miss for {}, fetching", key);
        self.store.counters().record_miss();

        // The store lock is not held here; other lookups proceed while we wait.
        let response = match fetcher.fetch_by_reference(reference, translation).await {
            Ok(response) => response,
            Err(e) => {
                self.store.counters().record_fetch_failure();
                return Err(e);
            }
        };

        self.put(reference, response.clone());
        Ok(response)
    }
}
