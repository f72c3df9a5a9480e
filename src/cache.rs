//! Time-bounded response cache keyed by the requested URL.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use governor::clock::{Clock, DefaultClock, Reference};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::MetadataRecord;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// URL → [`MetadataRecord`] map with a fixed TTL from insertion.
///
/// Expired entries are never returned, even before the sweeper gets to them.
/// Records are cloned out; nothing outside the cache can mutate a stored one.
pub struct ResponseCache<C: Clock = DefaultClock> {
    entries: RwLock<HashMap<String, CachedEntry<C::Instant>>>,
    ttl: Duration,
    sweep_interval: Duration,
    clock: C,
}

struct CachedEntry<I> {
    record: MetadataRecord,
    inserted_at: I,
}

impl ResponseCache<DefaultClock> {
    pub fn new(ttl: Duration, sweep_interval: Duration) -> Self {
        Self::with_clock(ttl, sweep_interval, DefaultClock::default())
    }
}

impl Default for ResponseCache<DefaultClock> {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_SWEEP_INTERVAL)
    }
}

impl<C: Clock> ResponseCache<C> {
    pub fn with_clock(ttl: Duration, sweep_interval: Duration, clock: C) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            sweep_interval,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    fn is_expired(&self, inserted_at: C::Instant, now: C::Instant) -> bool {
        let age: Duration = now.duration_since(inserted_at).into();
        age > self.ttl
    }

    /// Returns the stored record if it is still within its TTL.
    pub fn get(&self, url: &str) -> Option<MetadataRecord> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(url)?;

        if self.is_expired(entry.inserted_at, self.clock.now()) {
            return None;
        }

        Some(entry.record.clone())
    }

    /// Store `record` under `url`, replacing any previous entry and
    /// restarting its TTL.
    pub fn set(&self, url: &str, record: MetadataRecord) {
        let inserted_at = self.clock.now();
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), CachedEntry { record, inserted_at });
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !self.is_expired(entry.inserted_at, now));
        before - entries.len()
    }

    /// Number of entries that would still be served.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| !self.is_expired(entry.inserted_at, now))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<C> ResponseCache<C>
where
    C: Clock + Send + Sync + 'static,
{
    /// Purge expired entries every sweep interval until the task is aborted.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.sweep_interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let removed = self.purge_expired();
                debug!(removed, "Swept expired cache entries");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;

    fn record(title: &str) -> MetadataRecord {
        MetadataRecord {
            title: title.into(),
            ..MetadataRecord::new("https://example.com/a", "https://example.com")
        }
    }

    fn fake_cache(ttl_secs: u64) -> (ResponseCache<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        let cache = ResponseCache::with_clock(
            Duration::from_secs(ttl_secs),
            DEFAULT_SWEEP_INTERVAL,
            clock.clone(),
        );
        (cache, clock)
    }

    #[test]
    fn miss_on_empty_cache() {
        let (cache, _) = fake_cache(60);
        assert!(cache.get("https://example.com/a").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn hit_within_ttl() {
        let (cache, clock) = fake_cache(60);
        cache.set("https://example.com/a", record("A"));

        clock.advance(Duration::from_secs(60));
        assert_eq!(cache.get("https://example.com/a").unwrap().title, "A");
    }

    #[test]
    fn expired_entry_is_never_returned_before_sweep() {
        let (cache, clock) = fake_cache(60);
        cache.set("https://example.com/a", record("A"));

        clock.advance(Duration::from_secs(61));
        assert!(cache.get("https://example.com/a").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn set_overwrites_and_resets_ttl() {
        let (cache, clock) = fake_cache(60);
        cache.set("https://example.com/a", record("old"));

        clock.advance(Duration::from_secs(50));
        cache.set("https://example.com/a", record("new"));

        clock.advance(Duration::from_secs(50));
        assert_eq!(cache.get("https://example.com/a").unwrap().title, "new");
    }

    #[test]
    fn keys_are_exact_urls() {
        let (cache, _) = fake_cache(60);
        cache.set("https://example.com/a", record("A"));
        assert!(cache.get("https://example.com/a/").is_none());
        assert!(cache.get("https://EXAMPLE.com/a").is_none());
    }

    #[test]
    fn purge_removes_only_expired_entries() {
        let (cache, clock) = fake_cache(60);
        cache.set("old", record("old"));
        clock.advance(Duration::from_secs(45));
        cache.set("fresh", record("fresh"));
        clock.advance(Duration::from_secs(30));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get("fresh").is_some());
    }

    #[test]
    fn returned_record_is_a_copy() {
        let (cache, _) = fake_cache(60);
        cache.set("https://example.com/a", record("A"));

        let mut served = cache.get("https://example.com/a").unwrap();
        served.duration_ms = 999;

        assert_eq!(cache.get("https://example.com/a").unwrap().duration_ms, 0);
    }

    #[test]
    fn default_cache_uses_reference_intervals() {
        let cache: ResponseCache = ResponseCache::default();
        assert_eq!(cache.ttl(), Duration::from_secs(1800));
        assert_eq!(cache.sweep_interval(), Duration::from_secs(3600));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_purges_on_interval() {
        let clock = FakeRelativeClock::default();
        let cache = Arc::new(ResponseCache::with_clock(
            Duration::from_secs(10),
            Duration::from_secs(60),
            clock.clone(),
        ));
        cache.set("a", record("A"));
        clock.advance(Duration::from_secs(11));

        let handle = Arc::clone(&cache).spawn_sweeper();
        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        assert_eq!(cache.entries.read().unwrap().len(), 0);
        handle.abort();
    }
}
