//! Time-to-live cache for upstream lookups
//!
//! Entries are checked lazily on access; nothing runs in the background.
//! A fetch that found nothing is cached as `None` and counts as a hit
//! until it expires, so a failing site is not re-queried on every request.
//!
//! The map lock is released while the fetcher runs. Two callers that miss
//! on the same key at the same time will both fetch, and the later write
//! wins.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `Instant::now`
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|e| e.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|e| e.into_inner());
        self.base + offset
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: Option<V>,
    fetched_at: Instant,
}

/// Result of a non-fetching read
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<V> {
    /// Never fetched, or the entry has expired
    Miss,
    /// Fresh entry; `None` means upstream had no data
    Hit(Option<V>),
}

/// Key/value cache with a single fixed TTL
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Display,
    V: Clone,
{
    pub fn new(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Read an entry without fetching
    pub async fn lookup(&self, key: &K) -> CacheLookup<V> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if self.is_fresh(entry) => CacheLookup::Hit(entry.value.clone()),
            _ => CacheLookup::Miss,
        }
    }

    /// Return the cached value for `key`, calling `fetcher` when it is
    /// missing or older than the TTL. Whatever the fetcher returns,
    /// including `None`, replaces the previous entry.
    pub async fn get_or_fetch<F, Fut>(&self, key: &K, fetcher: F) -> Option<V>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Option<V>>,
    {
        if let CacheLookup::Hit(value) = self.lookup(key).await {
            tracing::trace!(cache = self.name, %key, "cache hit");
            return value;
        }

        tracing::debug!(cache = self.name, %key, "cache miss, fetching");
        let value = fetcher(key.clone()).await;

        let entry = CacheEntry {
            value: value.clone(),
            fetched_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.clone(), entry);

        value
    }

    /// Number of stored entries, fresh or not
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    fn is_fresh(&self, entry: &CacheEntry<V>) -> bool {
        self.clock.now().saturating_duration_since(entry.fetched_at) <= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;

    const TTL: Duration = Duration::from_secs(120);

    fn cache_with_clock() -> (TtlCache<String, String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::new("test", TTL, clock.clone());
        (cache, clock)
    }

    fn key(s: &str) -> String {
        s.to_string()
    }

    #[tokio::test]
    async fn test_second_call_within_ttl_is_served_from_cache() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        let fetch = |k: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Some(format!("value-{}", k)) }
        };

        let first = cache.get_or_fetch(&key("A"), fetch).await;
        clock.advance(Duration::from_secs(60));
        let second = cache.get_or_fetch(&key("A"), fetch).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first, Some("value-A".to_string()));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_entry_at_exactly_ttl_is_still_fresh() {
        let (cache, clock) = cache_with_clock();
        cache.get_or_fetch(&key("A"), |_| async { Some(key("v1")) }).await;

        clock.advance(TTL);
        let value = cache.get_or_fetch(&key("A"), |_| async { Some(key("v2")) }).await;

        assert_eq!(value, Some(key("v1")));
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched_once_and_replaced() {
        let (cache, clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        cache.get_or_fetch(&key("A"), |_| async { Some(key("old")) }).await;
        clock.advance(TTL + Duration::from_secs(1));

        let fetch = |_k: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Some(key("new")) }
        };
        let refreshed = cache.get_or_fetch(&key("A"), fetch).await;
        assert_eq!(refreshed, Some(key("new")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // The replacement carries a new timestamp, so it is fresh for a full TTL
        clock.advance(TTL);
        let again = cache.get_or_fetch(&key("A"), fetch).await;
        assert_eq!(again, Some(key("new")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_absence_is_cached_and_distinct_from_unseen() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);

        assert_eq!(cache.lookup(&key("B")).await, CacheLookup::Miss);

        let fetch = |_k: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { None }
        };
        assert_eq!(cache.get_or_fetch(&key("B"), fetch).await, None);
        assert_eq!(cache.get_or_fetch(&key("B"), fetch).await, None);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.lookup(&key("B")).await, CacheLookup::Hit(None));
    }

    #[tokio::test]
    async fn test_cached_absence_expires_like_a_value() {
        let (cache, clock) = cache_with_clock();
        cache.get_or_fetch(&key("B"), |_| async { None }).await;

        clock.advance(TTL + Duration::from_millis(1));
        assert_eq!(cache.lookup(&key("B")).await, CacheLookup::Miss);

        let value = cache.get_or_fetch(&key("B"), |_| async { Some(key("back")) }).await;
        assert_eq!(value, Some(key("back")));
    }

    #[tokio::test]
    async fn test_entries_age_independently() {
        let (cache, clock) = cache_with_clock();

        cache.get_or_fetch(&key("A"), |_| async { Some(key("a")) }).await;
        clock.advance(Duration::from_secs(100));
        cache.get_or_fetch(&key("B"), |_| async { Some(key("b")) }).await;
        clock.advance(Duration::from_secs(30));

        assert_eq!(cache.lookup(&key("A")).await, CacheLookup::Miss);
        assert_eq!(cache.lookup(&key("B")).await, CacheLookup::Hit(Some(key("b"))));
    }

    #[tokio::test]
    async fn test_concurrent_misses_may_both_fetch() {
        let (cache, _clock) = cache_with_clock();
        let calls = AtomicUsize::new(0);
        let barrier = Barrier::new(2);

        // Each fetch waits for the other, which only completes if both
        // callers reached the fetcher.
        let fetch = |_k: String| {
            calls.fetch_add(1, Ordering::SeqCst);
            let barrier = &barrier;
            async move {
                barrier.wait().await;
                Some(key("v"))
            }
        };

        let k = key("A");
        let (a, b) = tokio::join!(cache.get_or_fetch(&k, fetch), cache.get_or_fetch(&k, fetch));

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(a, b);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_clear_forgets_everything() {
        let (cache, _clock) = cache_with_clock();
        cache.get_or_fetch(&key("A"), |_| async { Some(key("a")) }).await;
        assert!(!cache.is_empty().await);

        cache.clear().await;
        assert!(cache.is_empty().await);
        assert_eq!(cache.lookup(&key("A")).await, CacheLookup::Miss);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        /// Any access within the TTL window is served without a second fetch
        #[test]
        fn prop_within_ttl_fetches_once(ttl_secs in 1u64..600, elapsed_frac in 0.0f64..=1.0) {
            let clock = Arc::new(ManualClock::new());
            let ttl = Duration::from_secs(ttl_secs);
            let cache: TtlCache<String, u64> = TtlCache::new("prop", ttl, clock.clone());
            let calls = AtomicUsize::new(0);

            let fetch = |_k: String| {
                let n = calls.fetch_add(1, Ordering::SeqCst) as u64;
                async move { Some(n) }
            };

            let first = tokio_test::block_on(cache.get_or_fetch(&key("A"), fetch));
            clock.advance(ttl.mul_f64(elapsed_frac));
            let second = tokio_test::block_on(cache.get_or_fetch(&key("A"), fetch));

            prop_assert_eq!(calls.load(Ordering::SeqCst), 1);
            prop_assert_eq!(first, second);
        }
    }
}
