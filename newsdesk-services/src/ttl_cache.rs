//! In-memory TTL cache with per-key fetch coalescing
//!
//! Entries are whole values stamped with their creation time. An entry is
//! fresh while `now - created_at <= ttl`; after that it is only returned by
//! [`TtlCache::get_stale`] until the background sweep evicts it once it is
//! older than `ttl + retention`.
//!
//! [`TtlCache::get_or_fetch`] serializes fetches per key. Every write bumps a
//! global generation counter, so a caller that waited on the key lock can
//! tell that another caller stored a value in the meantime and reuse it
//! instead of fetching again. This holds for forced refreshes too: N
//! concurrent forced requests for one key produce one upstream fetch.

use std::collections::HashMap;
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::clock::SharedClock;

struct CacheEntry<V> {
    value: Arc<V>,
    created_at: DateTime<Utc>,
    generation: u64,
}

/// A value served from (or just written to) the cache
#[derive(Debug)]
pub struct CacheHit<V> {
    pub value: Arc<V>,
    /// Seconds since the value was stored
    pub age_secs: u64,
    /// The value was produced by an earlier fetch, not by this caller
    pub cached: bool,
    /// The value is past its TTL
    pub stale: bool,
}

impl<V> Clone for CacheHit<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            age_secs: self.age_secs,
            cached: self.cached,
            stale: self.stale,
        }
    }
}

pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    in_flight: DashMap<K, Arc<Mutex<()>>>,
    generation: AtomicU64,
    ttl: chrono::Duration,
    retention: chrono::Duration,
    clock: SharedClock,
    /// Name for logging purposes
    name: &'static str,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + Debug,
{
    pub fn new(
        name: &'static str,
        ttl: std::time::Duration,
        retention: std::time::Duration,
        clock: SharedClock,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            in_flight: DashMap::new(),
            generation: AtomicU64::new(0),
            ttl: to_chrono(ttl),
            retention: to_chrono(retention),
            clock,
            name,
        }
    }

    /// Fresh value for `key`, or `None` when absent or expired
    pub fn get(&self, key: &K) -> Option<CacheHit<V>> {
        self.lookup(key).filter(|(hit, _)| !hit.stale).map(|(hit, _)| hit)
    }

    /// Any retained value for `key`, flagged stale when past its TTL
    pub fn get_stale(&self, key: &K) -> Option<CacheHit<V>> {
        self.lookup(key).map(|(hit, _)| hit)
    }

    /// Store `value` under `key`, replacing any previous entry
    pub fn put(&self, key: K, value: V) -> Arc<V> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            value: Arc::clone(&value),
            created_at: self.clock.now(),
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        };
        debug!("[CACHE:{}] put {:?}", self.name, key);
        self.entries.write().insert(key, entry);
        value
    }

    /// Drop the entry for `key`. Returns whether one existed.
    pub fn invalidate(&self, key: &K) -> bool {
        let removed = self.entries.write().remove(key).is_some();
        if removed {
            info!("[CACHE:{}] invalidated {:?}", self.name, key);
        }
        removed
    }

    /// Evict entries older than `ttl + retention`, returning how many were removed
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let horizon = self.ttl + self.retention;
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, entry| now - entry.created_at <= horizon);
        before - entries.len()
    }

    /// Number of retained entries, fresh or not
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// All values still within their TTL
    pub fn fresh_values(&self) -> Vec<Arc<V>> {
        let now = self.clock.now();
        self.entries
            .read()
            .values()
            .filter(|entry| now - entry.created_at <= self.ttl)
            .map(|entry| Arc::clone(&entry.value))
            .collect()
    }

    /// Return a fresh value acceptable to `accept`, or run `fetch` and store its result.
    ///
    /// With `force` set a fresh entry is ignored, unless another caller
    /// stored a new value while this one was waiting for the key.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: K,
        force: bool,
        accept: impl Fn(&V) -> bool,
        fetch: F,
    ) -> Result<CacheHit<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let observed = self.lookup(&key).map(|(_, generation)| generation);

        if !force {
            if let Some(hit) = self.get(&key).filter(|hit| accept(&hit.value)) {
                debug!("[CACHE:{}] hit {:?} (age {}s)", self.name, key, hit.age_secs);
                return Ok(hit);
            }
        }

        let slot = InFlightSlot::join(&self.in_flight, key.clone());
        let _held = slot.lock.lock().await;

        let reusable = self.lookup(&key).and_then(|(hit, generation)| {
            let written_while_waiting = Some(generation) != observed;
            (!hit.stale && accept(&hit.value) && (written_while_waiting || !force)).then_some(hit)
        });

        match reusable {
            Some(hit) => {
                debug!("[CACHE:{}] coalesced {:?}", self.name, key);
                Ok(hit)
            }
            None => {
                info!("[CACHE:{}] miss {:?} (force={})", self.name, key, force);
                fetch().await.map(|value| CacheHit {
                    value: self.put(key.clone(), value),
                    age_secs: 0,
                    cached: false,
                    stale: false,
                })
            }
        }
    }

    /// Keys with a fetch currently in progress or queued
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn lookup(&self, key: &K) -> Option<(CacheHit<V>, u64)> {
        let now = self.clock.now();
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        let age = now - entry.created_at;
        Some((
            CacheHit {
                value: Arc::clone(&entry.value),
                age_secs: age.num_seconds().max(0) as u64,
                cached: true,
                stale: age > self.ttl,
            },
            entry.generation,
        ))
    }
}

/// A caller's claim on a key's fetch lock.
///
/// Dropping it, on completion or when the caller's future is abandoned,
/// removes the map slot if no other caller holds or waits on the lock.
struct InFlightSlot<'a, K: Eq + Hash> {
    map: &'a DashMap<K, Arc<Mutex<()>>>,
    key: K,
    lock: Arc<Mutex<()>>,
}

impl<'a, K: Eq + Hash + Clone> InFlightSlot<'a, K> {
    fn join(map: &'a DashMap<K, Arc<Mutex<()>>>, key: K) -> Self {
        let lock = Arc::clone(&*map.entry(key.clone()).or_default());
        Self { map, key, lock }
    }
}

impl<K: Eq + Hash> Drop for InFlightSlot<'_, K> {
    fn drop(&mut self) {
        // Only the map and this claim hold the lock when nobody is waiting
        self.map
            .remove_if(&self.key, |_, lock| Arc::strong_count(lock) <= 2);
    }
}

fn to_chrono(duration: std::time::Duration) -> chrono::Duration {
    chrono::Duration::from_std(duration).unwrap_or(chrono::Duration::MAX)
}
