//! Expiring key-value cache
//!
//! A best-effort TTL cache layered over a [`Storage`] surface. It is installed
//! as the cache shim when the browser has no service worker to do background
//! caching.
//!
//! Entries are stored as JSON envelopes:
//!
//! ```text
//! {"value": <any JSON>, "expiresAt": <unix ms>}
//! ```
//!
//! The cache never raises. Write failures are logged and dropped, read
//! failures look like a miss.

pub mod storage;

use std::{fmt, sync::Arc};

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::host::Clock;
pub use storage::{MemoryStorage, Storage, StorageError, DEFAULT_QUOTA_BYTES};

/// Default entry lifetime (5 minutes)
pub const DEFAULT_TTL_MS: u64 = 300_000;

/// Stored envelope for one cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: Value,
    /// Absolute expiry, Unix milliseconds
    pub expires_at: i64,
}

impl CacheEntry {
    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }
}

/// Internal failure while talking to the persistence surface
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// TTL cache over a synchronous string store
pub struct ExpiringCache {
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    default_ttl_ms: u64,
}

impl ExpiringCache {
    pub fn new(storage: Arc<dyn Storage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            clock,
            default_ttl_ms: DEFAULT_TTL_MS,
        }
    }

    pub fn with_default_ttl(mut self, ttl_ms: u64) -> Self {
        self.default_ttl_ms = ttl_ms;
        self
    }

    pub fn default_ttl_ms(&self) -> u64 {
        self.default_ttl_ms
    }

    /// Store `value` under `key` with the default TTL
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.default_ttl_ms);
    }

    /// Store `value` under `key`, expiring `ttl_ms` from now
    ///
    /// Failures (unserializable value, quota, unavailable storage) are logged
    /// at warning level and otherwise ignored.
    pub fn set_with_ttl<T: Serialize + ?Sized>(&self, key: &str, value: &T, ttl_ms: u64) {
        if let Err(e) = self.try_set(key, value, ttl_ms) {
            warn!("Cache write for {key:?} dropped: {e}");
        }
    }

    fn try_set<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        ttl_ms: u64,
    ) -> Result<(), CacheError> {
        let ttl = i64::try_from(ttl_ms).unwrap_or(i64::MAX);
        let entry = CacheEntry {
            value: serde_json::to_value(value)?,
            expires_at: self.clock.now_ms().saturating_add(ttl),
        };
        let payload = serde_json::to_string(&entry)?;

        match self.storage.set_item(key, &payload) {
            Ok(()) => Ok(()),
            Err(StorageError::QuotaExceeded { .. }) => {
                let purged = self.purge_expired();
                debug!("Quota exceeded writing {key:?}, purged {purged} expired entries");
                self.storage.set_item(key, &payload)?;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Read the live value under `key`
    ///
    /// Returns `None` when the key is absent, the payload is malformed, or the
    /// entry has expired. An expired entry is deleted on this access.
    pub fn get(&self, key: &str) -> Option<Value> {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("Cache read for {key:?} failed: {e}");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Ignoring malformed cache entry {key:?}: {e}");
                return None;
            }
        };

        if entry.is_expired(self.clock.now_ms()) {
            debug!("Cache entry {key:?} expired");
            self.remove(key);
            return None;
        }

        Some(entry.value)
    }

    /// Typed read; a value that does not deserialize as `T` is a miss
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("Cache entry {key:?} has unexpected shape: {e}");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.storage.remove_item(key) {
            warn!("Cache delete for {key:?} failed: {e}");
        }
    }

    /// Delete every expired envelope in the store, returning how many went
    ///
    /// Keys that do not hold a cache envelope are left alone.
    pub fn purge_expired(&self) -> usize {
        let keys = match self.storage.keys() {
            Ok(keys) => keys,
            Err(e) => {
                warn!("Cache purge skipped: {e}");
                return 0;
            }
        };

        let now = self.clock.now_ms();
        let mut purged = 0;
        for key in keys {
            let Ok(Some(raw)) = self.storage.get_item(&key) else {
                continue;
            };
            let Ok(entry) = serde_json::from_str::<CacheEntry>(&raw) else {
                continue;
            };
            if entry.is_expired(now) && self.storage.remove_item(&key).is_ok() {
                purged += 1;
            }
        }
        purged
    }
}

impl fmt::Debug for ExpiringCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiringCache")
            .field("default_ttl_ms", &self.default_ttl_ms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;
    use crate::host::ManualClock;

    fn make_cache(quota: usize) -> (ExpiringCache, Arc<MemoryStorage>, Arc<ManualClock>) {
        let storage = Arc::new(MemoryStorage::new(quota));
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = ExpiringCache::new(storage.clone(), clock.clone());
        (cache, storage, clock)
    }

    #[test]
    fn test_round_trip_and_expiry() {
        let (cache, storage, clock) = make_cache(DEFAULT_QUOTA_BYTES);

        cache.set_with_ttl("k", &json!({"a": 1}), 1000);

        clock.advance(500);
        assert_eq!(cache.get("k"), Some(json!({"a": 1})));

        clock.advance(1000);
        assert_eq!(cache.get("k"), None);
        assert_eq!(storage.get_item("k").unwrap(), None);
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let (cache, storage, clock) = make_cache(DEFAULT_QUOTA_BYTES);
        cache.set_with_ttl("k", "v", 100);

        clock.advance(99);
        assert_eq!(cache.get("k"), Some(json!("v")));

        clock.advance(1);
        assert_eq!(cache.get("k"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_envelope_format() {
        let (cache, storage, _clock) = make_cache(DEFAULT_QUOTA_BYTES);
        cache.set("k", &42);

        let raw = storage.get_item("k").unwrap().unwrap();
        let parsed: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed["value"], json!(42));
        assert_eq!(parsed["expiresAt"], json!(1_000_000 + 300_000));
    }

    #[test]
    fn test_unserializable_value_is_dropped() {
        let (cache, storage, _clock) = make_cache(DEFAULT_QUOTA_BYTES);

        // JSON object keys must be strings
        let mut bad = HashMap::new();
        bad.insert((1, 2), "tuple key");
        cache.set("bad", &bad);

        assert!(storage.is_empty());
        assert_eq!(cache.get("bad"), None);
    }

    #[test]
    fn test_malformed_payload_reads_as_miss() {
        let (cache, storage, _clock) = make_cache(DEFAULT_QUOTA_BYTES);
        storage.set_item("k", "{not json").unwrap();
        storage.set_item("shape", r#"{"value": 1}"#).unwrap();

        assert_eq!(cache.get("k"), None);
        assert_eq!(cache.get("shape"), None);
    }

    #[test]
    fn test_unavailable_storage_never_raises() {
        let clock = Arc::new(ManualClock::new(0));
        let cache = ExpiringCache::new(Arc::new(MemoryStorage::disabled()), clock);

        cache.set("k", "v");
        assert_eq!(cache.get("k"), None);
        cache.remove("k");
        assert_eq!(cache.purge_expired(), 0);
    }

    #[test]
    fn test_quota_pressure_purges_expired_entries() {
        let (cache, storage, clock) = make_cache(100);

        cache.set_with_ttl("old", "xxxxxxxxxxxxxxxxxxxx", 10);
        clock.advance(20);

        // Does not fit alongside "old", fits once "old" is swept
        cache.set_with_ttl("new", "yyyyyyyyyyyyyyyyyyyy", 1000);

        assert_eq!(storage.get_item("old").unwrap(), None);
        assert_eq!(cache.get("new"), Some(json!("yyyyyyyyyyyyyyyyyyyy")));
    }

    #[test]
    fn test_quota_exhausted_is_silent() {
        let (cache, storage, _clock) = make_cache(16);
        cache.set("k", "this value is far too large for the quota");
        assert!(storage.is_empty());
    }

    #[test]
    fn test_get_as_typed() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Repo {
            name: String,
            stars: u32,
        }

        let (cache, _storage, _clock) = make_cache(DEFAULT_QUOTA_BYTES);
        let repo = Repo {
            name: "compat".into(),
            stars: 7,
        };
        cache.set("repo", &repo);

        assert_eq!(cache.get_as::<Repo>("repo"), Some(repo));
        assert_eq!(cache.get_as::<Vec<u8>>("repo"), None);
    }

    #[test]
    fn test_purge_leaves_foreign_keys() {
        let (cache, storage, clock) = make_cache(DEFAULT_QUOTA_BYTES);
        storage.set_item("theme", "dark").unwrap();
        cache.set_with_ttl("a", &1, 10);
        cache.set_with_ttl("b", &2, 10_000);

        clock.advance(50);
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(storage.keys().unwrap(), vec!["b".to_string(), "theme".to_string()]);
    }
}
