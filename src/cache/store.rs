//! Cache store persisted as one serialized block
//!
//! The whole cache is a single JSON map stored under one storage key. Every
//! mutation is a load-mutate-save cycle over the entire map, and cycles are
//! serialized by a mutex so two concurrent writers cannot lose each other's
//! updates. The mutex is never held across an await point: network fetches
//! happen outside of it.
//!
//! Reads and writes never fail from the caller's point of view. Missing or
//! corrupt data loads as an empty cache, and failed writes are logged and
//! counted in `CacheStats` but otherwise ignored.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::entry::{CacheEntry, CacheMap};
use super::stats::{CacheCounters, CacheStats};
use crate::storage::Storage;

/// Storage key holding the serialized cache map
pub const CACHE_STORAGE_KEY: &str = "verseCache";

/// Process-wide verse cache backed by a `Storage`
pub struct CacheStore {
    storage: Arc<dyn Storage>,
    /// Held for the duration of each load-mutate-save cycle
    cycle: Mutex<()>,
    counters: CacheCounters,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore")
            .field("stats", &self.counters.snapshot())
            .finish_non_exhaustive()
    }
}

impl CacheStore {
    /// Creates a store over the given storage backend
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            cycle: Mutex::new(()),
            counters: CacheCounters::default(),
        }
    }

    /// Loads the whole cache map
    ///
    /// Returns an empty map if nothing is stored or the stored data cannot be
    /// decoded.
    pub fn load(&self) -> CacheMap {
        let _guard = self.lock();
        self.read_map()
    }

    /// Replaces the persisted cache map with `map`
    pub fn save(&self, map: &CacheMap) {
        let _guard = self.lock();
        self.write_value(CACHE_STORAGE_KEY, map);
    }

    /// Removes the persisted cache entirely, including `extra_keys`
    pub fn clear(&self, extra_keys: &[&str]) {
        let _guard = self.lock();
        for key in std::iter::once(&CACHE_STORAGE_KEY).chain(extra_keys) {
            if let Err(e) = self.storage.remove(key) {
                self.counters.record_storage_failure();
                warn!("Failed to remove {} from storage: {}", key, e);
            }
        }
        info!("Verse cache cleared");
    }

    /// Drops every entry whose expiry is at or before `now`
    ///
    /// Returns how many entries were removed. Reads never purge on their own;
    /// this is explicit maintenance.
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let removed = self.update(|map| {
            let before = map.len();
            map.retain(|_, entry| entry.expires_at > now);
            before - map.len()
        });
        info!("Purged {} expired cache entries", removed);
        removed
    }

    /// Returns the entry stored under `key`, fresh or not
    pub fn get(&self, key: &str) -> Option<CacheEntry> {
        self.load().remove(key)
    }

    /// Stores `entry` under `key`, replacing any previous entry
    pub fn insert(&self, key: &str, entry: CacheEntry) {
        self.update(|map| {
            map.insert(key.to_string(), entry);
        });
    }

    /// Runs one serialized load-mutate-save cycle
    ///
    /// `mutate` sees the freshly loaded map; whatever it leaves behind is
    /// written back before the lock is released.
    pub fn update<R>(&self, mutate: impl FnOnce(&mut CacheMap) -> R) -> R {
        let _guard = self.lock();
        let mut map = self.read_map();
        let result = mutate(&mut map);
        self.write_value(CACHE_STORAGE_KEY, &map);
        result
    }

    /// Number of entries currently persisted, expired ones included
    pub fn len(&self) -> usize {
        self.load().len()
    }

    /// True when nothing is persisted
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Counters for this store since it was created
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    pub(crate) fn counters(&self) -> &CacheCounters {
        &self.counters
    }

    /// Reads and decodes a value stored under some other key
    ///
    /// Same absorbing rules as the cache map: missing or undecodable data is
    /// `None`.
    pub(crate) fn read_value<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let _guard = self.lock();
        self.read_decoded(key)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_map(&self) -> CacheMap {
        self.read_decoded(CACHE_STORAGE_KEY).unwrap_or_default()
    }

    fn read_decoded<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = match self.storage.get(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                self.counters.record_storage_failure();
                warn!("Failed to read {} from storage, treating as empty: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                self.counters.record_corrupt_load();
                warn!("Corrupt data under {}, treating as empty: {}", key, e);
                None
            }
        }
    }

    fn write_value<T: Serialize>(&self, key: &str, value: &T) {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.counters.record_storage_failure();
                warn!("Failed to encode {}, not persisted: {}", key, e);
                return;
            }
        };

        match self.storage.set(key, &bytes) {
            Ok(()) => debug!("Persisted {} ({} bytes)", key, bytes.len()),
            Err(e) => {
                self.counters.record_storage_failure();
                warn!("Failed to persist {}: {}", key, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::john_3_16;
    use crate::storage::{FileStorage, MemoryStorage, StorageError};
    use chrono::{Duration, TimeZone};
    use tempfile::TempDir;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, day, hour, 0, 0).unwrap()
    }

    fn memory_store() -> (CacheStore, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        (CacheStore::new(storage.clone()), storage)
    }

    fn entry(cached_at: DateTime<Utc>) -> CacheEntry {
        CacheEntry::with_ttl(john_3_16("web"), cached_at, Duration::hours(24))
    }

    /// Storage whose every operation fails
    struct BrokenStorage;

    impl Storage for BrokenStorage {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(std::io::Error::other("disk on fire").into())
        }
    }

    #[test]
    fn test_load_returns_empty_when_absent() {
        let (store, _storage) = memory_store();
        assert!(store.load().is_empty());
        assert_eq!(store.stats().corrupt_loads, 0);
    }

    #[test]
    fn test_load_returns_empty_for_garbage_bytes() {
        let (store, storage) = memory_store();
        storage.set(CACHE_STORAGE_KEY, b"\x00\xffnot json at all").unwrap();

        assert!(store.load().is_empty());
        assert_eq!(store.stats().corrupt_loads, 1);
    }

    #[test]
    fn test_load_returns_empty_for_wrong_shape() {
        let (store, storage) = memory_store();
        storage.set(CACHE_STORAGE_KEY, br#"{"john3_16": 42}"#).unwrap();

        assert!(store.load().is_empty());
    }

    #[test]
    fn test_insert_then_get() {
        let (store, _storage) = memory_store();
        store.insert("john3_16", entry(at(15, 8)));

        let loaded = store.get("john3_16").expect("Entry should exist");
        assert_eq!(loaded.value, john_3_16("web"));
        assert_eq!(loaded.cached_at, at(15, 8));
        assert!(store.get("romans8_28").is_none());
    }

    #[test]
    fn test_save_replaces_whole_map() {
        let (store, _storage) = memory_store();
        store.insert("a", entry(at(15, 8)));

        let mut map = CacheMap::new();
        map.insert("b".to_string(), entry(at(15, 9)));
        store.save(&map);

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("b"));
    }

    #[test]
    fn test_insert_over_corrupt_data_starts_fresh() {
        let (store, storage) = memory_store();
        storage.set(CACHE_STORAGE_KEY, b"garbage").unwrap();

        store.insert("john3_16", entry(at(15, 8)));

        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_clear_removes_block_and_extra_keys() {
        let (store, storage) = memory_store();
        store.insert("john3_16", entry(at(15, 8)));
        storage.set("dailyVerseDate", b"\"2024-07-15\"").unwrap();

        store.clear(&["dailyVerseDate"]);

        assert!(store.is_empty());
        assert!(storage.get(CACHE_STORAGE_KEY).unwrap().is_none());
        assert!(storage.get("dailyVerseDate").unwrap().is_none());
    }

    #[test]
    fn test_purge_expired_keeps_only_future_entries() {
        let (store, _storage) = memory_store();
        // expires 15th 08:00
        store.insert("old", entry(at(14, 8)));
        // expires exactly at purge time
        store.insert("edge", entry(at(14, 12)));
        // expires 16th 08:00
        store.insert("new", entry(at(15, 8)));

        let removed = store.purge_expired(at(15, 12));

        assert_eq!(removed, 2);
        let map = store.load();
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("new"));
    }

    #[test]
    fn test_broken_storage_is_absorbed() {
        let store = CacheStore::new(Arc::new(BrokenStorage));

        assert!(store.load().is_empty());
        store.insert("john3_16", entry(at(15, 8)));
        store.clear(&[]);

        // load, then insert's load + save, then clear's remove
        assert_eq!(store.stats().storage_failures, 4);
    }

    #[test]
    fn test_file_backed_store_survives_reopen() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        {
            let store = CacheStore::new(Arc::new(FileStorage::new(temp_dir.path())));
            store.insert("john3_16", entry(at(15, 8)));
        }

        let reopened = CacheStore::new(Arc::new(FileStorage::new(temp_dir.path())));
        assert_eq!(reopened.get("john3_16").unwrap().value, john_3_16("web"));
    }

    #[test]
    fn test_file_backed_corrupt_file_degrades_to_empty() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        std::fs::write(temp_dir.path().join("verseCache.json"), "{{{{").unwrap();

        let store = CacheStore::new(Arc::new(FileStorage::new(temp_dir.path())));
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let (store, _storage) = memory_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for j in 0..10 {
                        store.insert(&format!("ref{}_{}", i, j), entry(at(15, 8)));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 80);
    }
}
