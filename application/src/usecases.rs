use crate::ports::{MarketDataSource, PageCache};
use crate::throttle::CallSpacer;
use bytes::Bytes;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

/// Outcome of resolving one page request.
#[derive(Clone, Debug)]
pub enum Resolution {
    /// Served from cache within the TTL; upstream was not touched.
    FreshCache(Bytes),
    /// Fetched from upstream and written back to the cache.
    Refreshed(Bytes),
    /// Upstream failed but an (expired) cache entry existed for the key.
    StaleFallback(Bytes),
    /// Upstream failed and the cache holds nothing for the key.
    Unavailable,
}

impl Resolution {
    pub fn payload(&self) -> Option<&Bytes> {
        match self {
            Resolution::FreshCache(payload)
            | Resolution::Refreshed(payload)
            | Resolution::StaleFallback(payload) => Some(payload),
            Resolution::Unavailable => None,
        }
    }
}

/// The per-request orchestration: consult the cache, take a throttle slot on
/// a miss, call upstream once, write back on success, fall back to whatever
/// the cache has on failure. Never retries within a single call; a later
/// client request is the retry.
#[derive(Clone)]
pub struct FetchPageUseCase {
    cache: Arc<dyn PageCache>,
    source: Arc<dyn MarketDataSource>,
    spacer: Arc<CallSpacer>,
    ttl: Duration,
}

impl FetchPageUseCase {
    pub fn new(
        cache: Arc<dyn PageCache>,
        source: Arc<dyn MarketDataSource>,
        spacer: Arc<CallSpacer>,
        ttl: Duration,
    ) -> Self {
        Self {
            cache,
            source,
            spacer,
            ttl,
        }
    }

    pub async fn exec(&self, key: &str) -> Resolution {
        // Fast path: a fresh entry short-circuits before the throttle, so
        // cache hits never contend for upstream capacity.
        if let Some(entry) = self.cache.get(key).await {
            if entry.is_fresh(self.ttl) {
                info!(key, "request within cache tolerance period, serving from cache");
                return Resolution::FreshCache(entry.payload);
            }
        }

        // Concurrent misses for the same key are not collapsed: each takes
        // its own slot and calls upstream in turn.
        self.spacer.acquire().await;
        match self.source.fetch(key).await {
            Ok(payload) => {
                self.cache.put(key, payload.clone(), Instant::now()).await;
                info!(key, "retrieved data from upstream and added to cache");
                Resolution::Refreshed(payload)
            }
            Err(err) => {
                warn!(key, %err, "upstream call failed, attempting to serve from cache");
                match self.cache.get(key).await {
                    Some(entry) => Resolution::StaleFallback(entry.payload),
                    None => Resolution::Unavailable,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use shared::CachedPage;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MapCache {
        entries: Mutex<HashMap<String, CachedPage>>,
    }

    impl MapCache {
        fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl PageCache for MapCache {
        async fn get(&self, key: &str) -> Option<CachedPage> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        async fn put(&self, key: &str, payload: Bytes, fetched_at: Instant) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), CachedPage::new(payload, fetched_at));
        }
    }

    /// Replays a queue of canned upstream results and records call times.
    #[derive(Default)]
    struct ScriptedSource {
        responses: Mutex<VecDeque<shared::Result<Bytes>>>,
        calls: AtomicUsize,
        call_times: Mutex<Vec<Instant>>,
    }

    impl ScriptedSource {
        fn push_ok(&self, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Ok(Bytes::from(body.to_string())));
        }

        fn push_status(&self, status: u16) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(shared::Error::UpstreamStatus(status)));
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for ScriptedSource {
        async fn fetch(&self, _key: &str) -> shared::Result<Bytes> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.call_times.lock().unwrap().push(Instant::now());
            // Suspend once so concurrent resolves interleave like real
            // network calls would.
            tokio::task::yield_now().await;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(shared::Error::UpstreamTransport("exhausted".into())))
        }
    }

    fn use_case(
        cache: &Arc<MapCache>,
        source: &Arc<ScriptedSource>,
        ttl: Duration,
        wait: Duration,
    ) -> FetchPageUseCase {
        FetchPageUseCase::new(
            cache.clone(),
            source.clone(),
            Arc::new(CallSpacer::new(wait)),
            ttl,
        )
    }

    const TTL: Duration = Duration::from_secs(900);
    const WAIT: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn empty_cache_refreshes_from_upstream() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        let resolution = fetch.exec("page-1").await;
        assert!(matches!(resolution, Resolution::Refreshed(ref p) if p == "payload_a"));
        assert_eq!(source.calls(), 1);
        assert_eq!(cache.get("page-1").await.unwrap().payload, "payload_a");
    }

    #[tokio::test(start_paused = true)]
    async fn fresh_entry_bypasses_upstream_and_throttle() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        fetch.exec("page-1").await;
        tokio::time::advance(Duration::from_secs(5)).await;

        let resolution = fetch.exec("page-1").await;
        assert!(matches!(resolution, Resolution::FreshCache(ref p) if p == "payload_a"));
        // Still only the original upstream call.
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_is_refetched() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        source.push_ok("payload_b");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        fetch.exec("page-1").await;
        tokio::time::advance(TTL).await;

        let resolution = fetch.exec("page-1").await;
        assert!(matches!(resolution, Resolution::Refreshed(ref p) if p == "payload_b"));
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn upstream_failure_falls_back_to_stale_entry() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        source.push_status(429);
        let fetch = use_case(&cache, &source, TTL, WAIT);

        fetch.exec("page-1").await;
        tokio::time::advance(Duration::from_secs(901)).await;

        let resolution = fetch.exec("page-1").await;
        assert!(matches!(resolution, Resolution::StaleFallback(ref p) if p == "payload_a"));
    }

    #[tokio::test(start_paused = true)]
    async fn upstream_failure_with_empty_cache_is_unavailable() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_status(502);
        let fetch = use_case(&cache, &source, TTL, WAIT);

        let resolution = fetch.exec("page-1").await;
        assert!(matches!(resolution, Resolution::Unavailable));
        assert!(resolution.payload().is_none());
        // One attempt only, no retry inside a single resolve.
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_overwrites_instead_of_accumulating() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        source.push_ok("payload_b");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        fetch.exec("page-1").await;
        tokio::time::advance(TTL).await;
        fetch.exec("page-1").await;

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("page-1").await.unwrap().payload, "payload_b");
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_misses_on_distinct_keys_share_the_throttle() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        source.push_ok("payload_b");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        let (first, second) = tokio::join!(fetch.exec("page-1"), fetch.exec("page-2"));
        assert!(matches!(first, Resolution::Refreshed(_)));
        assert!(matches!(second, Resolution::Refreshed(_)));

        let times = source.call_times.lock().unwrap();
        assert_eq!(times.len(), 2);
        assert!(times[1] - times[0] >= WAIT);
    }

    #[tokio::test(start_paused = true)]
    async fn same_key_misses_are_not_deduplicated() {
        let cache = Arc::new(MapCache::default());
        let source = Arc::new(ScriptedSource::default());
        source.push_ok("payload_a");
        source.push_ok("payload_a2");
        let fetch = use_case(&cache, &source, TTL, WAIT);

        // Both pass the freshness check before either refresh lands, so each
        // makes its own upstream call.
        let (first, second) = tokio::join!(fetch.exec("page-1"), fetch.exec("page-1"));
        assert!(matches!(first, Resolution::Refreshed(_)));
        assert!(matches!(second, Resolution::Refreshed(_)));
        assert_eq!(source.calls(), 2);
        assert_eq!(cache.len(), 1);
    }
}
