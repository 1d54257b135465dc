//! # Expiring key-value cache
//!
//! Generic in-memory store with per-entry TTL. One readers-writer lock guards the
//! whole table: any number of `get`s run together, `set`/`delete`/sweep are
//! exclusive. Expired entries are invisible to `get` immediately and are
//! physically removed by the periodic sweep (or by `purge_expired`).
//!
//! Time comes from `tokio::time::Instant` so tests can drive expiry with a
//! paused clock.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Minimal cache contract consumed by the aggregator.
pub trait Cache<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    /// `ttl == Duration::ZERO` means the entry never expires.
    fn set(&self, key: &str, value: V, ttl: Duration);
    fn delete(&self, key: &str);
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    /// `None` = never expires.
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug)]
pub struct InMemoryCache<V> {
    items: RwLock<HashMap<String, Entry<V>>>,
}

impl<V> Default for InMemoryCache<V> {
    fn default() -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send + Sync + 'static> InMemoryCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every expired entry in one pass. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        let before = items.len();
        items.retain(|_, e| !e.is_expired(now));
        before - items.len()
    }

    /// Physical entry count, expired-but-unswept entries included.
    pub fn len(&self) -> usize {
        self.items
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Spawn the periodic sweep. The first pass runs one `interval` after start.
    pub fn spawn_sweeper(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let period = interval.max(Duration::from_millis(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let removed = self.purge_expired();
                if removed > 0 {
                    counter!("cache_swept_total").increment(removed as u64);
                }
                tracing::debug!(target: "cache", removed, "sweep pass");
            }
        })
    }
}

impl<V: Clone + Send + Sync + 'static> Cache<V> for InMemoryCache<V> {
    fn get(&self, key: &str) -> Option<V> {
        let items = self.items.read().unwrap_or_else(PoisonError::into_inner);
        let entry = items.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    fn set(&self, key: &str, value: V, ttl: Duration) {
        let expires_at = (!ttl.is_zero()).then(|| Instant::now() + ttl);
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.insert(key.to_string(), Entry { value, expires_at });
    }

    fn delete(&self, key: &str) {
        let mut items = self.items.write().unwrap_or_else(PoisonError::into_inner);
        items.remove(key);
    }
}
