//! Process-lifetime state guarding the geocoding providers.
//!
//! [`ResultCache`] remembers geocode outcomes (including "not found") for an
//! hour, and [`RateLimiter`] enforces a minimum spacing between requests from
//! one client. Both sit on a [`KeyValueStore`] that is created once per
//! process and shared by all requests.
//!
//! Entries are never evicted. Stale cache entries are ignored on read, and
//! rate-limit entries live for as long as the process. Under heavy traffic
//! from many distinct clients both maps grow without bound.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use crate::place::Coordinates;

/// How long a geocode result stays fresh.
pub const RESULT_TTL: TimeDelta = TimeDelta::hours(1);

/// Minimum spacing between requests from one client.
pub const MIN_REQUEST_INTERVAL: TimeDelta = TimeDelta::milliseconds(1100);

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
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
    millis: AtomicI64,
}

impl ManualClock {
    /// Start at the given instant.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            millis: AtomicI64::new(start.timestamp_millis()),
        }
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        self.millis
            .fetch_add(delta.num_milliseconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

/// A value with the time it was written.
#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<V> {
    pub value: V,
    pub at: DateTime<Utc>,
}

/// Shared string-keyed storage.
///
/// Implementations decide where entries live; expiry is the caller's job.
pub trait KeyValueStore<V>: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Option<Stamped<V>>> + Send;
    fn put(&self, key: String, entry: Stamped<V>) -> impl Future<Output = ()> + Send;

    /// Write `entry` unless the current entry is younger than `min_age` as of
    /// `entry.at`. On refusal, returns the current entry's stamp.
    ///
    /// The read and the write must be one atomic step.
    fn put_if_older(
        &self,
        key: String,
        entry: Stamped<V>,
        min_age: TimeDelta,
    ) -> impl Future<Output = Result<(), DateTime<Utc>>> + Send;

    fn len(&self) -> impl Future<Output = usize> + Send;
}

/// In-process [`KeyValueStore`] backed by a `HashMap`.
#[derive(Debug)]
pub struct MemoryStore<V> {
    inner: RwLock<HashMap<String, Stamped<V>>>,
}

impl<V> Default for MemoryStore<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone + Send + Sync> KeyValueStore<V> for MemoryStore<V> {
    async fn get(&self, key: &str) -> Option<Stamped<V>> {
        self.inner.read().await.get(key).cloned()
    }

    async fn put(&self, key: String, entry: Stamped<V>) {
        self.inner.write().await.insert(key, entry);
    }

    async fn put_if_older(
        &self,
        key: String,
        entry: Stamped<V>,
        min_age: TimeDelta,
    ) -> Result<(), DateTime<Utc>> {
        let mut map = self.inner.write().await;
        if let Some(current) = map.get(&key)
            && entry.at - current.at < min_age
        {
            return Err(current.at);
        }
        map.insert(key, entry);
        Ok(())
    }

    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

/// Geocode outcome cache keyed by query and destination.
///
/// `Some(None)` from [`ResultCache::get`] is a cached "not found".
#[derive(Debug)]
pub struct ResultCache<S = MemoryStore<Option<Coordinates>>> {
    store: S,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl ResultCache {
    /// In-memory cache with the standard one-hour TTL.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(MemoryStore::default(), clock, RESULT_TTL)
    }
}

impl<S: KeyValueStore<Option<Coordinates>>> ResultCache<S> {
    /// Create a cache over `store`.
    pub fn new(store: S, clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self { store, clock, ttl }
    }

    /// `lowercase(query) | lowercase(destination)`.
    pub fn cache_key(query: &str, destination: Option<&str>) -> String {
        format!(
            "{}|{}",
            query.to_lowercase(),
            destination.unwrap_or_default().to_lowercase()
        )
    }

    /// Fresh cached outcome, if any. Stale entries count as misses but stay
    /// in the store.
    pub async fn get(&self, query: &str, destination: Option<&str>) -> Option<Option<Coordinates>> {
        let key = Self::cache_key(query, destination);
        let entry = self.store.get(&key).await?;
        if self.clock.now() - entry.at < self.ttl {
            debug!(%key, "geocode cache hit");
            Some(entry.value)
        } else {
            debug!(%key, "geocode cache entry stale");
            None
        }
    }

    /// Record an outcome, overwriting any previous entry.
    pub async fn put(&self, query: &str, destination: Option<&str>, coordinates: Option<Coordinates>) {
        let key = Self::cache_key(query, destination);
        let entry = Stamped {
            value: coordinates,
            at: self.clock.now(),
        };
        self.store.put(key, entry).await;
    }

    /// Number of stored entries, fresh or stale.
    pub async fn len(&self) -> usize {
        self.store.len().await
    }
}

/// Returned when a client calls again too soon.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rate limited: retry in {retry_after_ms} ms")]
pub struct RateLimited {
    /// Time until the client may call again.
    pub retry_after_ms: i64,
}

/// Per-client minimum request spacing.
#[derive(Debug)]
pub struct RateLimiter<S = MemoryStore<()>> {
    store: S,
    clock: Arc<dyn Clock>,
    min_interval: TimeDelta,
}

impl RateLimiter {
    /// In-memory limiter with the standard 1.1 s spacing.
    pub fn in_memory(clock: Arc<dyn Clock>) -> Self {
        Self::new(MemoryStore::default(), clock, MIN_REQUEST_INTERVAL)
    }
}

impl<S: KeyValueStore<()>> RateLimiter<S> {
    /// Create a limiter over `store`.
    pub fn new(store: S, clock: Arc<dyn Clock>, min_interval: TimeDelta) -> Self {
        Self {
            store,
            clock,
            min_interval,
        }
    }

    /// Admit or reject a request from `client_id`.
    ///
    /// Only admitted requests update the client's last-seen time. Concurrent
    /// calls for one client admit at most one per window.
    pub async fn check(&self, client_id: &str) -> Result<(), RateLimited> {
        let now = self.clock.now();
        self.store
            .put_if_older(
                client_id.to_string(),
                Stamped { value: (), at: now },
                self.min_interval,
            )
            .await
            .map_err(|last| RateLimited {
                retry_after_ms: (self.min_interval - (now - last)).num_milliseconds(),
            })
    }

    /// Number of clients ever seen.
    pub async fn tracked_clients(&self) -> usize {
        self.store.len().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        ))
    }

    const KL: Coordinates = Coordinates {
        lat: 3.139,
        lng: 101.6869,
    };

    #[test]
    fn cache_key_is_lowercased() {
        assert_eq!(
            ResultCache::<MemoryStore<Option<Coordinates>>>::cache_key("Wat PHO", Some("Bangkok")),
            "wat pho|bangkok"
        );
        assert_eq!(
            ResultCache::<MemoryStore<Option<Coordinates>>>::cache_key("Wat Pho", None),
            "wat pho|"
        );
    }

    #[tokio::test]
    async fn cache_ttl() {
        let clock = clock();
        let cache = ResultCache::in_memory(clock.clone());

        cache.put("Petronas Towers", Some("KL"), Some(KL)).await;

        clock.advance(TimeDelta::minutes(59));
        assert_eq!(cache.get("petronas towers", Some("kl")).await, Some(Some(KL)));

        clock.advance(TimeDelta::minutes(2));
        assert_eq!(cache.get("Petronas Towers", Some("KL")).await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn cache_stores_not_found() {
        let cache = ResultCache::in_memory(clock());
        assert_eq!(cache.get("nowhere", None).await, None);
        cache.put("nowhere", None, None).await;
        assert_eq!(cache.get("nowhere", None).await, Some(None));
    }

    #[tokio::test]
    async fn cache_put_overwrites_and_restamps() {
        let clock = clock();
        let cache = ResultCache::in_memory(clock.clone());
        cache.put("x", None, None).await;
        clock.advance(TimeDelta::minutes(50));
        cache.put("x", None, Some(KL)).await;
        clock.advance(TimeDelta::minutes(50));
        assert_eq!(cache.get("x", None).await, Some(Some(KL)));
    }

    #[tokio::test]
    async fn rate_limit_spacing() {
        let clock = clock();
        let limiter = RateLimiter::in_memory(clock.clone());

        assert!(limiter.check("10.0.0.1").await.is_ok());
        clock.advance(TimeDelta::milliseconds(500));
        let err = limiter.check("10.0.0.1").await.unwrap_err();
        assert_eq!(err.retry_after_ms, 600);

        // Other clients are independent.
        assert!(limiter.check("10.0.0.2").await.is_ok());

        clock.advance(TimeDelta::milliseconds(700));
        assert!(limiter.check("10.0.0.1").await.is_ok());
        assert_eq!(limiter.tracked_clients().await, 2);
    }

    #[tokio::test]
    async fn rejected_request_does_not_extend_window() {
        let clock = clock();
        let limiter = RateLimiter::in_memory(clock.clone());

        assert!(limiter.check("c").await.is_ok());
        clock.advance(TimeDelta::milliseconds(1000));
        assert!(limiter.check("c").await.is_err());
        clock.advance(TimeDelta::milliseconds(101));
        assert!(limiter.check("c").await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_checks_admit_one_per_client() {
        const CLIENTS: usize = 200;
        const PER_CLIENT: usize = 8;

        let limiter = Arc::new(RateLimiter::in_memory(clock()));
        let barrier = Arc::new(tokio::sync::Barrier::new(CLIENTS * PER_CLIENT));

        let mut handles = Vec::with_capacity(CLIENTS * PER_CLIENT);
        for client in 0..CLIENTS {
            for _ in 0..PER_CLIENT {
                let limiter = limiter.clone();
                let barrier = barrier.clone();
                handles.push(tokio::spawn(async move {
                    barrier.wait().await;
                    (client, limiter.check(&format!("10.1.{client}")).await.is_ok())
                }));
            }
        }

        let mut admitted = vec![0; CLIENTS];
        for handle in handles {
            let (client, ok) = handle.await.unwrap();
            if ok {
                admitted[client] += 1;
            }
        }
        assert!(admitted.iter().all(|&n| n == 1), "{admitted:?}");
        assert_eq!(limiter.tracked_clients().await, CLIENTS);
    }

    #[tokio::test]
    async fn put_if_older_reports_current_stamp() {
        let store = MemoryStore::default();
        let t0 = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let min = TimeDelta::seconds(1);

        assert_eq!(store.put_if_older("k".into(), Stamped { value: 1, at: t0 }, min).await, Ok(()));
        let soon = t0 + TimeDelta::milliseconds(999);
        assert_eq!(store.put_if_older("k".into(), Stamped { value: 2, at: soon }, min).await, Err(t0));
        assert_eq!(store.get("k").await.map(|e| e.value), Some(1));

        let later = t0 + min;
        assert_eq!(store.put_if_older("k".into(), Stamped { value: 3, at: later }, min).await, Ok(()));
        assert_eq!(store.get("k").await, Some(Stamped { value: 3, at: later }));
    }
}
