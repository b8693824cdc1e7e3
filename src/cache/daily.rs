//! Verse of the day
//!
//! The daily slot is one entry in the shared cache map, stored under a
//! reserved key that no normalized reference can produce (normalized keys are
//! always lower-case). Its freshness is decided by calendar day in the local
//! time zone, not by a rolling window: a verse fetched at 23:59 goes stale a
//! minute later, and one fetched at 00:05 is reused until midnight.
//!
//! Older installs stored the daily verse outside the map, as a bare response
//! under `dailyVerseData` plus a `yyyy-MM-dd` string under `dailyVerseDate`.
//! Those fields are still read, and a same-day legacy verse is moved into the
//! map on first use.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, Utc};
use tracing::{debug, info};

use super::entry::CacheEntry;
use super::store::CacheStore;
use crate::clock::Clock;
use crate::data::{FetchError, VerseFetcher, VerseResponse};

/// Cache key of the daily slot
pub const DAILY_SLOT_KEY: &str = "dailyVerse";

/// Legacy storage key holding the bare daily response
pub const LEGACY_DAILY_DATA_KEY: &str = "dailyVerseData";

/// Legacy storage key holding the daily marker date
pub const LEGACY_DAILY_DATE_KEY: &str = "dailyVerseDate";

/// Format of the freshness marker
const DAY_TOKEN_FORMAT: &str = "%Y-%m-%d";

/// Where the daily slot stands relative to today
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DailySlotState {
    /// Nothing has ever been stored
    Empty,
    /// A verse fetched today
    Fresh {
        /// Local day the verse was fetched, `yyyy-MM-dd`
        date: String,
    },
    /// A verse from an earlier day
    Stale {
        /// Local day the verse was fetched, `yyyy-MM-dd`
        date: String,
    },
}

/// Calendar-day policy over the shared cache store
pub struct DailyVerse {
    store: Arc<CacheStore>,
    clock: Arc<dyn Clock>,
}

impl DailyVerse {
    /// Creates the daily policy over `store`
    pub fn new(store: Arc<CacheStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Today's marker, `yyyy-MM-dd` in the local time zone
    pub fn today_token(&self) -> String {
        day_token(self.clock.now())
    }

    /// Current state of the daily slot
    pub fn state(&self) -> DailySlotState {
        let today = self.today_token();
        let date = match self.store.get(DAILY_SLOT_KEY) {
            Some(entry) => Some(day_token(entry.cached_at.with_timezone(&Local))),
            None => self.store.read_value::<String>(LEGACY_DAILY_DATE_KEY),
        };

        match date {
            None => DailySlotState::Empty,
            Some(date) if date == today => DailySlotState::Fresh { date },
            Some(date) => DailySlotState::Stale { date },
        }
    }

    /// Today's cached verse, if one was fetched today
    pub fn cached(&self) -> Option<VerseResponse> {
        let today = self.today_token();

        if let Some(entry) = self.store.get(DAILY_SLOT_KEY) {
            return (day_token(entry.cached_at.with_timezone(&Local)) == today)
                .then_some(entry.value);
        }

        self.migrate_legacy(&today)
    }

    /// The stored daily verse regardless of its day
    ///
    /// Never used by `todays_verse` itself; callers can show it as a degraded
    /// fallback when a refetch fails.
    pub fn last_known(&self) -> Option<VerseResponse> {
        self.store
            .get(DAILY_SLOT_KEY)
            .map(|entry| entry.value)
            .or_else(|| self.store.read_value(LEGACY_DAILY_DATA_KEY))
    }

    /// Stores `response` as today's verse
    pub fn put(&self, response: VerseResponse) {
        let now = self.clock.now();
        let entry = CacheEntry::with_expiry(
            response,
            now.with_timezone(&Utc),
            next_local_midnight(now).with_timezone(&Utc),
        );
        self.store.insert(DAILY_SLOT_KEY, entry);
    }

    /// Returns today's verse, fetching a random one if the slot is not from today
    ///
    /// # Arguments
    /// * `fetcher` - Remote source for the random verse
    /// * `translation` - Translation id passed through to the fetcher
    ///
    /// # Returns
    /// * `Ok(VerseResponse)` from today's slot or a successful fetch
    /// * `Err(FetchError)` as reported by the fetcher; the slot is left as it
    ///   was so the next call tries again
    pub async fn todays_verse<F: VerseFetcher>(
        &self,
        fetcher: &F,
        translation: &str,
    ) -> Result<VerseResponse, FetchError> {
        if let Some(cached) = self.cached() {
            debug!("Daily verse cache hit for {}", self.today_token());
            self.store.counters().record_hit();
            return Ok(cached);
        }

        debug!("No daily verse for {}, fetching a random verse", self.today_token());
        self.store.counters().record_miss();

        let response = match fetcher.fetch_random(translation).await {
            Ok(response) => response,
            Err(e) => {
                self.store.counters().record_fetch_failure();
                return Err(e);
            }
        };

        self.put(response.clone());
        Ok(response)
    }

    /// Moves a same-day legacy verse into the map and returns it
    fn migrate_legacy(&self, today: &str) -> Option<VerseResponse> {
        let date: String = self.store.read_value(LEGACY_DAILY_DATE_KEY)?;
        if date != today {
            return None;
        }
        let response: VerseResponse = self.store.read_value(LEGACY_DAILY_DATA_KEY)?;

        info!("Migrating legacy daily verse for {}", date);
        self.put(response.clone());
        Some(response)
    }
}

/// Formats the local calendar day of `at`
fn day_token(at: DateTime<Local>) -> String {
    at.format(DAY_TOKEN_FORMAT).to_string()
}

/// First instant of the next local day
fn next_local_midnight(now: DateTime<Local>) -> DateTime<Local> {
    now.date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
        .unwrap_or(now + Duration::hours(24))
}
