// Read-through cache with whole-cache eviction on a fixed interval.
//
// Each resource kind gets its own typed `ExpiringCache`. Reads past the flush
// interval drop every entry, so all cached data of a kind shares one
// freshness window. `get_or_fetch` serializes fetches per key so concurrent
// callers within a window trigger at most one upstream request.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

struct CacheState<K, V> {
    entries: HashMap<K, V>,
    last_flush: Instant,
}

pub struct ExpiringCache<K, V> {
    name: &'static str,
    flush_interval: Duration,
    state: Mutex<CacheState<K, V>>,
    in_flight: Mutex<HashMap<K, Arc<tokio::sync::Mutex<()>>>>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(name: &'static str, flush_interval: Duration) -> Self {
        Self {
            name,
            flush_interval,
            state: Mutex::new(CacheState {
                entries: HashMap::new(),
                last_flush: Instant::now(),
            }),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a key, flushing the whole cache first if the interval has
    /// elapsed since the last flush.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.lock_state();
        self.flush_if_stale(&mut state);
        state.entries.get(key).cloned()
    }

    pub fn put(&self, key: K, value: V) {
        let mut state = self.lock_state();
        self.flush_if_stale(&mut state);
        state.entries.insert(key, value);
    }

    pub fn len(&self) -> usize {
        self.lock_state().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        let mut state = self.lock_state();
        state.entries.clear();
        state.last_flush = Instant::now();
    }

    /// Return the cached value or run `fetch` and cache its result. Errors
    /// are not cached.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }

        let gate = self.gate(&key);
        let result = {
            let _guard = gate.lock().await;
            // Another caller may have filled the entry while we waited.
            match self.get(&key) {
                Some(value) => Ok(value),
                None => {
                    debug!(cache = self.name, "Cache miss, fetching");
                    let fetched = fetch().await;
                    if let Ok(value) = &fetched {
                        self.put(key.clone(), value.clone());
                    }
                    fetched
                }
            }
        };
        self.release_gate(&key, gate);
        result
    }

    fn gate(&self, key: &K) -> Arc<tokio::sync::Mutex<()>> {
        let mut in_flight = self.lock_in_flight();
        Arc::clone(in_flight.entry(key.clone()).or_default())
    }

    /// Drop the caller's handle and remove the key's gate once no other caller
    /// holds or awaits it. Handles are only cloned and dropped under the map
    /// lock, so the count is stable here.
    fn release_gate(&self, key: &K, gate: Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = self.lock_in_flight();
        let unshared = in_flight
            .get(key)
            .is_some_and(|held| Arc::ptr_eq(held, &gate) && Arc::strong_count(&gate) == 2);
        drop(gate);
        if unshared {
            in_flight.remove(key);
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, HashMap<K, Arc<tokio::sync::Mutex<()>>>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_state(&self) -> MutexGuard<'_, CacheState<K, V>> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn flush_if_stale(&self, state: &mut CacheState<K, V>) {
        if state.last_flush.elapsed() >= self.flush_interval {
            if !state.entries.is_empty() {
                debug!(
                    cache = self.name,
                    entries = state.entries.len(),
                    "Flushing expired cache"
                );
            }
            state.entries.clear();
            state.last_flush = Instant::now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn entries_survive_within_interval() {
        let cache = ExpiringCache::new("test", Duration::from_secs(30));
        cache.put(1u32, "a");
        tokio::time::advance(Duration::from_secs(29)).await;
        assert_eq!(cache.get(&1), Some("a"));
    }

    #[tokio::test(start_paused = true)]
    async fn whole_cache_flushes_after_interval() {
        let cache = ExpiringCache::new("test", Duration::from_secs(30));
        cache.put(1u32, "a");
        tokio::time::advance(Duration::from_secs(20)).await;
        // Inserted late, but still evicted with the rest.
        cache.put(2u32, "b");
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(cache.get(&2), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn get_or_fetch_fetches_once_per_window() {
        let cache = ExpiringCache::new("test", Duration::from_secs(30));
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, ()>(42u32)
        };

        assert_eq!(cache.get_or_fetch((), fetch).await, Ok(42));
        assert_eq!(cache.get_or_fetch((), fetch).await, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.get_or_fetch((), fetch).await, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_fetch() {
        let cache = Arc::new(ExpiringCache::new("test", Duration::from_secs(30)));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = Arc::clone(&cache);
            let calls = Arc::clone(&calls);
            handles.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(7u32, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(100)).await;
                        Ok::<_, ()>("value")
                    })
                    .await
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap(), Ok("value"));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.lock_in_flight().is_empty());
    }

    #[tokio::test]
    async fn gates_are_released_after_each_fetch() {
        let cache: ExpiringCache<u64, u64> = ExpiringCache::new("test", Duration::from_secs(30));
        for id in 0..50u64 {
            assert_eq!(cache.get_or_fetch(id, || async move { Ok::<_, ()>(id * 2) }).await, Ok(id * 2));
        }
        let failed = cache.get_or_fetch(99, || async { Err::<u64, _>("boom") }).await;
        assert_eq!(failed, Err("boom"));

        assert_eq!(cache.len(), 50);
        assert!(cache.lock_in_flight().is_empty());
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache: ExpiringCache<u32, u32> = ExpiringCache::new("test", Duration::from_secs(30));
        let failed = cache.get_or_fetch(1, || async { Err::<u32, _>("boom") }).await;
        assert_eq!(failed, Err("boom"));
        assert!(cache.get(&1).is_none());
    }
}
