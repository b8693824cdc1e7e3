//! Persisted cache entries

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::data::VerseResponse;

/// The whole persisted cache: normalized key to entry
pub type CacheMap = HashMap<String, CacheEntry>;

/// A cached verse with its freshness window
///
/// Serialized as `{"value": ..., "cachedAt": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// The cached passage
    pub value: VerseResponse,
    /// When the entry was stored
    pub cached_at: DateTime<Utc>,
    /// After this instant the entry is stale
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates an entry cached at `cached_at` that lives for `ttl`
    pub fn with_ttl(value: VerseResponse, cached_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            value,
            cached_at,
            expires_at: cached_at + ttl,
        }
    }

    /// Creates an entry with an explicit expiry instant
    pub fn with_expiry(
        value: VerseResponse,
        cached_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value,
            cached_at,
            expires_at,
        }
    }

    /// An entry is usable up to and including its expiry instant
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::john_3_16;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32, sec: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 7, 15, hour, min, sec).unwrap()
    }

    #[test]
    fn test_with_ttl_sets_expiry() {
        let entry = CacheEntry::with_ttl(john_3_16("web"), at(8, 0, 0), Duration::hours(24));
        assert_eq!(entry.expires_at, at(8, 0, 0) + Duration::hours(24));
        assert!(entry.expires_at > entry.cached_at);
    }

    #[test]
    fn test_is_fresh_at_boundary() {
        let entry = CacheEntry::with_expiry(john_3_16("web"), at(8, 0, 0), at(9, 0, 0));
        assert!(entry.is_fresh_at(at(8, 30, 0)));
        assert!(entry.is_fresh_at(at(9, 0, 0)));
        assert!(!entry.is_fresh_at(at(9, 0, 1)));
    }

    #[test]
    fn test_serialized_field_names() {
        let entry = CacheEntry::with_ttl(john_3_16("web"), at(8, 0, 0), Duration::hours(24));
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("value").is_some());
        assert!(json.get("cachedAt").is_some());
        assert!(json.get("expiresAt").is_some());
        assert_eq!(json["value"]["translation_id"], "web");
        assert_eq!(json["value"]["verses"][0]["book_id"], "JHN");
    }
}
