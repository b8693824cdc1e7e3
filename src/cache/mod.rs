//! Local verse cache
//!
//! One persisted store, two policies over it:
//! - `ReferenceCache`: lookups by reference with a fixed 24 hour TTL
//! - `DailyVerse`: one random verse per local calendar day
//!
//! `VerseCache` is built once at startup and handed to whatever needs it.
//! The two policies use disjoint keys in the same map and share the store's
//! serialization of load-mutate-save cycles.

mod daily;
mod entry;
mod key;
mod reference;
mod stats;
mod store;

pub use daily::{
    DailySlotState, DailyVerse, DAILY_SLOT_KEY, LEGACY_DAILY_DATA_KEY, LEGACY_DAILY_DATE_KEY,
};
pub use entry::{CacheEntry, CacheMap};
pub use key::normalize_reference;
pub use reference::{ReferenceCache, REFERENCE_TTL_HOURS};
pub use stats::CacheStats;
pub use store::{CacheStore, CACHE_STORAGE_KEY};

use std::sync::Arc;

use chrono::Utc;

use crate::clock::{Clock, SystemClock};
use crate::data::{FetchError, VerseFetcher, VerseResponse};
use crate::storage::{MemoryStorage, Storage};

/// The verse cache: one store with a TTL policy and a calendar-day policy
pub struct VerseCache {
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
    reference: ReferenceCache,
    daily: DailyVerse,
}

impl VerseCache {
    /// Creates a cache persisted in `storage` that reads time from `clock`
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(CacheStore::new(storage));
        Self {
            reference: ReferenceCache::new(store.clone(), clock.clone()),
            daily: DailyVerse::new(store.clone(), clock.clone()),
            store,
            clock,
        }
    }

    /// A cache that lives only as long as the process, on the system clock
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStorage::new()), Arc::new(SystemClock))
    }

    /// The TTL policy for reference lookups
    pub fn reference(&self) -> &ReferenceCache {
        &self.reference
    }

    /// The calendar-day policy for the verse of the day
    pub fn daily(&self) -> &DailyVerse {
        &self.daily
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Looks up `reference`, fetching it on a miss; see `ReferenceCache::get_or_fetch`
    pub async fn get_or_fetch<F: VerseFetcher>(
        &self,
        fetcher: &F,
        reference: &str,
        translation: &str,
    ) -> Result<VerseResponse, FetchError> {
        self.reference
            .get_or_fetch(fetcher, reference, translation)
            .await
    }

    /// Today's verse, fetched at most once per day; see `DailyVerse::todays_verse`
    pub async fn todays_verse<F: VerseFetcher>(
        &self,
        fetcher: &F,
        translation: &str,
    ) -> Result<VerseResponse, FetchError> {
        self.daily.todays_verse(fetcher, translation).await
    }

    /// Drops expired entries as of now; returns how many were removed
    pub fn purge_expired(&self) -> usize {
        self.store.purge_expired(self.clock.now().with_timezone(&Utc))
    }

    /// Removes everything cached, legacy daily fields included
    pub fn clear(&self) {
        self.store
            .clear(&[LEGACY_DAILY_DATA_KEY, LEGACY_DAILY_DATE_KEY]);
    }

    /// Counters since this cache was created
    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared helpers for cache tests

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex, PoisonError};
    use std::time::Duration;

    use chrono::{DateTime, Local};

    use super::VerseCache;
    use crate::clock::FixedClock;
    use crate::data::fixtures::{john_3_16, psalm_23_1};
    use crate::data::{FetchError, VerseFetcher, VerseResponse};
    use crate::storage::MemoryStorage;

    /// Builds an in-memory cache on a fixed clock starting at `now`
    pub fn test_cache(now: DateTime<Local>) -> (VerseCache, Arc<FixedClock>, Arc<MemoryStorage>) {
        let clock = Arc::new(FixedClock::new(now));
        let storage = Arc::new(MemoryStorage::new());
        let cache = VerseCache::new(storage.clone(), clock.clone());
        (cache, clock, storage)
    }

    /// Fetcher that counts calls and can be told to fail
    ///
    /// Reference lookups return the John 3:16 fixture in the requested
    /// translation, relabeled with the requested reference. Random lookups
    /// return Psalm 23:1.
    #[derive(Debug, Default)]
    pub struct CountingFetcher {
        reference_calls: AtomicUsize,
        random_calls: AtomicUsize,
        fail_status: Mutex<Option<u16>>,
        delay: Option<Duration>,
    }

    impl CountingFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Makes every later call fail with this status (404 means not found)
        pub fn fail_with(&self, status: Option<u16>) {
            *self.fail_status.lock().unwrap_or_else(PoisonError::into_inner) = status;
        }

        pub fn reference_calls(&self) -> usize {
            self.reference_calls.load(Ordering::SeqCst)
        }

        pub fn random_calls(&self) -> usize {
            self.random_calls.load(Ordering::SeqCst)
        }

        async fn respond(&self, response: VerseResponse) -> Result<VerseResponse, FetchError> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let status = *self.fail_status.lock().unwrap_or_else(PoisonError::into_inner);
            match status {
                Some(404) => Err(FetchError::NotFound),
                Some(status) => Err(FetchError::Http { status }),
                None => Ok(response),
            }
        }
    }

    impl VerseFetcher for CountingFetcher {
        async fn fetch_by_reference(
            &self,
            reference: &str,
            translation: &str,
        ) -> Result<VerseResponse, FetchError> {
            self.reference_calls.fetch_add(1, Ordering::SeqCst);
            let mut response = john_3_16(translation);
            response.reference = reference.to_string();
            self.respond(response).await
        }

        async fn fetch_random(&self, _translation: &str) -> Result<VerseResponse, FetchError> {
            self.random_calls.fetch_add(1, Ordering::SeqCst);
            self.respond(psalm_23_1()).await
        }
    }
}
