//! Time-bounded result cache
//!
//! Keys are derived deterministically from the request (coordinate rounded to
//! a fixed precision, optional station id, optional hour-truncated historical
//! timestamp), so identical lookups within the TTL never reach the vendor
//! twice. Entries expire lazily at read time; there is no background sweep.
//! The map is `Mutex`-guarded and `get_or_fetch` deduplicates concurrent
//! identical in-flight lookups.

use crate::error::{Error, Result};
use crate::models::Coordinate;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};
use tracing::debug;

/// Decimal places a coordinate is rounded to before key derivation (~11 m)
pub const KEY_PRECISION: u32 = 4;

struct StoredEntry {
    value: Value,
    expires_at: SystemTime,
}

/// Process-wide in-memory cache
pub struct Cache {
    entries: Mutex<HashMap<String, StoredEntry>>,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl Cache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Store a serializable value with a time-to-live
    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) -> Result<()> {
        self.set_at(key, value, ttl, SystemTime::now())
    }

    /// Retrieve a value if present and not expired; expired entries count as
    /// a miss and are dropped
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get_at(key, SystemTime::now())
    }

    /// Look up the cache first; on a miss, run `fetch` and store the result.
    /// Concurrent callers with the same key wait for the first fetch instead
    /// of issuing their own (single-flight).
    pub fn get_or_fetch<T, F>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Result<T>,
    {
        if let Some(hit) = self.get(key) {
            debug!("cache hit: {key}");
            return Ok(hit);
        }

        let gate = {
            let mut inflight = self.inflight.lock().unwrap();
            inflight
                .entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _held = gate.lock().unwrap();

        // A concurrent caller may have populated the entry while we waited
        if let Some(hit) = self.get(key) {
            debug!("cache hit after wait: {key}");
            return Ok(hit);
        }

        debug!("cache miss: {key}");
        let outcome = fetch();
        if let Ok(value) = &outcome {
            self.set(key, value, ttl)?;
        }

        // Late arrivals for the same key get a fresh gate; the entry they
        // find in the cache makes the extra mutex harmless
        self.inflight.lock().unwrap().remove(key);
        outcome
    }

    /// Manually drop a key
    pub fn remove(&self, key: &str) {
        self.entries.lock().unwrap().remove(key);
    }

    fn set_at<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<()> {
        let value = serde_json::to_value(value)
            .map_err(|e| Error::config(format!("unserializable cache value: {e}")))?;
        let expires_at = now
            .checked_add(ttl)
            .ok_or_else(|| Error::config("TTL overflow"))?;
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), StoredEntry { value, expires_at });
        Ok(())
    }

    fn get_at<T: DeserializeOwned>(&self, key: &str, now: SystemTime) -> Option<T> {
        let mut entries = self.entries.lock().unwrap();
        let expired = match entries.get(key) {
            Some(entry) if now < entry.expires_at => {
                return serde_json::from_value(entry.value.clone()).ok();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!("cache entry expired: {key}");
            entries.remove(key);
        }
        None
    }
}

/// Truncate a Unix timestamp to the start of its hour
#[must_use]
pub fn truncate_to_hour(unix_secs: i64) -> i64 {
    unix_secs - unix_secs.rem_euclid(3600)
}

/// Cache key for a conditions lookup
///
/// The coordinate is rounded to [`KEY_PRECISION`] places so nearby repeat
/// lookups share an entry without conflating distinct locations; the
/// hour-truncated timestamp keeps distinct historical hours from colliding.
#[must_use]
pub fn conditions_key(
    provider: &str,
    coordinate: &Coordinate,
    station_id: Option<&str>,
    historical_unix: Option<i64>,
) -> String {
    let (lat, lon) = coordinate.rounded(KEY_PRECISION);
    let mut key = format!("conditions:{provider}:{lat:.4}:{lon:.4}");
    if let Some(id) = station_id {
        key.push_str(&format!(":st={id}"));
    }
    if let Some(ts) = historical_unix {
        key.push_str(&format!(":h={}", truncate_to_hour(ts)));
    }
    key
}

/// Cache key for a reverse-geocode lookup
#[must_use]
pub fn address_key(provider: &str, coordinate: &Coordinate) -> String {
    let (lat, lon) = coordinate.rounded(KEY_PRECISION);
    format!("address:{provider}:{lat:.4}:{lon:.4}")
}

/// Cache key for a vendor station sitelist
#[must_use]
pub fn sitelist_key(provider: &str, coordinate: &Coordinate) -> String {
    let (lat, lon) = coordinate.rounded(KEY_PRECISION);
    format!("stations:{provider}:{lat:.4}:{lon:.4}")
}
