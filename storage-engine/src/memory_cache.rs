use application::ports::PageCache;
use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use shared::CachedPage;
use tokio::time::Instant;

/// Sharded in-memory page cache. Entries are only ever inserted or
/// overwritten; nothing is evicted, so an expired entry stays available for
/// stale fallback until the next successful refresh replaces it. Freshness is
/// the caller's call, made from the stored fetch time.
#[derive(Default)]
pub struct MemoryPageCache {
    entries: DashMap<String, CachedPage>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl PageCache for MemoryPageCache {
    async fn get(&self, key: &str) -> Option<CachedPage> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    async fn put(&self, key: &str, payload: Bytes, fetched_at: Instant) {
        self.entries
            .insert(key.to_string(), CachedPage::new(payload, fetched_at));
    }
}
