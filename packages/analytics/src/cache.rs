//! Time-bounded memo for aggregate computations.
//!
//! Entries are keyed by the MD5 of the canonical (sorted-key) JSON form of
//! the filter parameters that produced them. An entry is served while
//! `now - stored_at < ttl`. Expired entries are evicted when looked up and
//! swept whenever a new entry is stored.
//! Distinct filter sets never invalidate each other.
//!
//! The mutex is held only to read or write the map, never while the value
//! is being computed. Two callers missing on the same key at the same time
//! both compute it; the later store wins.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Entry lifetime when none is configured.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;

/// Source of the current time for cache expiry.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock stopped at `start`.
    #[must_use]
    pub const fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock to `instant`.
    pub fn set(&self, instant: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Converts a TTL in whole seconds to a [`TimeDelta`], saturating.
#[must_use]
pub fn ttl_from_secs(secs: u64) -> TimeDelta {
    i64::try_from(secs)
        .ok()
        .and_then(TimeDelta::try_seconds)
        .unwrap_or(TimeDelta::MAX)
}

struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// TTL-bounded map from canonicalized filter parameters to computed values.
pub struct ResultCache<V> {
    entries: Mutex<BTreeMap<String, CacheEntry<V>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> ResultCache<V> {
    /// Creates an empty cache whose entries live for `ttl` as measured by
    /// `clock`.
    #[must_use]
    pub fn new(ttl: TimeDelta, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(BTreeMap::new()),
            ttl,
            clock,
        }
    }

    /// Creates an empty cache with the default TTL and the system clock.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ttl_from_secs(DEFAULT_CACHE_TTL_SECS), Arc::new(SystemClock))
    }

    /// Returns the cache key for `params`: the MD5 hex digest of their JSON
    /// form with object keys sorted.
    ///
    /// Returns `None` if the parameters cannot be represented as JSON.
    pub fn cache_key<P: Serialize + ?Sized>(params: &P) -> Option<String> {
        // `serde_json::Value` objects are ordered maps, so converting
        // through `Value` sorts keys at every nesting level.
        let canonical = serde_json::to_value(params).ok()?.to_string();
        let mut context = md5::Context::new();
        context.consume(canonical.as_bytes());
        Some(format!("{:x}", context.finalize()))
    }

    /// Returns the live value stored under `key`, evicting it if expired.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        let mut entries = self.lock();

        let live = entries
            .get(key)
            .map(|entry| now - entry.stored_at < self.ttl)?;
        if live {
            entries.get(key).map(|entry| entry.value.clone())
        } else {
            entries.remove(key);
            log::trace!("Cache entry {key} expired");
            None
        }
    }

    /// Stores `value` under `key`, stamped with the current time. Expired
    /// entries under other keys are dropped at the same time.
    pub fn insert(&self, key: String, value: V) {
        let stored_at = self.clock.now();
        let mut entries = self.lock();

        let before = entries.len();
        entries.retain(|_, entry| stored_at - entry.stored_at < self.ttl);
        let swept = before - entries.len();
        if swept > 0 {
            log::trace!("Swept {swept} expired cache entries");
        }

        entries.insert(key, CacheEntry { value, stored_at });
    }

    /// Returns the cached value for `params`, or computes, stores and
    /// returns it.
    pub fn get_or_compute<P, F>(&self, params: &P, compute: F) -> V
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> V,
    {
        match self.try_get_or_compute(params, || Ok::<V, std::convert::Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Fallible form of [`Self::get_or_compute`]. Errors are returned to the
    /// caller and nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns whatever `compute` returns.
    pub fn try_get_or_compute<P, F, E>(&self, params: &P, compute: F) -> Result<V, E>
    where
        P: Serialize + ?Sized,
        F: FnOnce() -> Result<V, E>,
    {
        let Some(key) = Self::cache_key(params) else {
            log::warn!("Could not canonicalize cache parameters; computing uncached");
            return compute();
        };

        if let Some(value) = self.get(&key) {
            log::trace!("Cache hit {key}");
            return Ok(value);
        }

        log::trace!("Cache miss {key}");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut entries = self.lock();
        let dropped = entries.len();
        entries.clear();
        log::info!("Cleared {dropped} cache entries");
    }

    /// Number of stored entries, expired ones included until looked up.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, CacheEntry<V>>> {
        // Entries are independent, so a panic mid-update cannot leave the
        // map inconsistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
