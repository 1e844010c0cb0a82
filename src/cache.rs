//! Expiring key-value cache with an injectable clock
//!
//! Backs team streaks and rate-limit windows. Time comes from a [`Clock`] so
//! tests can move it forward instead of sleeping.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tokio::sync::RwLock;

/// Source of "now" for expiry decisions
pub trait Clock: Send + Sync + std::fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    start: Instant,
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            elapsed: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        *elapsed += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let elapsed = *self.elapsed.lock().unwrap_or_else(|e| e.into_inner());
        self.start + elapsed
    }
}

/// Longest lifetime an entry can get; larger TTLs are clamped to it
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

fn expiry(from: Instant, ttl: Duration) -> Instant {
    let ttl = ttl.min(MAX_TTL);
    from.checked_add(ttl).unwrap_or_else(|| {
        tracing::warn!(?ttl, "Cache TTL overflows the clock, entry expires immediately");
        from
    })
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug, Clone)]
pub struct TtlCache<K, V> {
    entries: Arc<RwLock<HashMap<K, CacheEntry<V>>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Expiry for an entry written at `from` with the cache's TTL
    pub fn expiry_from(&self, from: Instant) -> Instant {
        expiry(from, self.ttl)
    }

    /// Live value for `key`; expired entries read as missing
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    pub async fn insert(&self, key: K, value: V) {
        self.insert_with_ttl(key, value, self.ttl).await;
    }

    pub async fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        let expires_at = expiry(self.clock.now(), ttl);
        self.entries
            .write()
            .await
            .insert(key, CacheEntry { value, expires_at });
    }

    /// Read-modify-write under one lock. `f` sees None for a missing or
    /// expired entry. A returned `(value, expires_at)` is stored as is;
    /// None removes the key.
    pub async fn update<F, R>(&self, key: K, f: F) -> R
    where
        F: FnOnce(Option<(&V, Instant)>) -> (Option<(V, Instant)>, R),
    {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;

        let current = entries
            .get(&key)
            .filter(|e| e.expires_at > now)
            .map(|e| (&e.value, e.expires_at));
        let (next, result) = f(current);

        match next {
            Some((value, expires_at)) => {
                entries.insert(key, CacheEntry { value, expires_at });
            }
            None => {
                entries.remove(&key);
            }
        }
        result
    }

    pub async fn remove(&self, key: &K) -> Option<V> {
        self.entries.write().await.remove(key).map(|e| e.value)
    }

    /// Drop expired entries (call periodically)
    pub async fn cleanup(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    /// Live entries as `(key, value)` pairs
    pub async fn snapshot(&self) -> Vec<(K, V)> {
        let now = self.clock.now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, e)| e.expires_at > now)
            .map(|(k, e)| (k.clone(), e.value.clone()))
            .collect()
    }
}
