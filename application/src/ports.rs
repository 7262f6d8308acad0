// application/src/ports.rs
use async_trait::async_trait;
use bytes::Bytes;
use shared::CachedPage;
use tokio::time::Instant;

/// Process-wide page cache. Absence is a normal outcome, not an error; `put`
/// unconditionally overwrites. Implementations must keep get/put atomic per
/// key under concurrent use, without blocking operations on other keys.
#[async_trait]
pub trait PageCache: Send + Sync + 'static {
    async fn get(&self, key: &str) -> Option<CachedPage>;
    async fn put(&self, key: &str, payload: Bytes, fetched_at: Instant);
}

/// One upstream fetch for the resource a key identifies. Returns the raw body
/// on 2xx, an error for any non-2xx status or transport failure.
#[async_trait]
pub trait MarketDataSource: Send + Sync + 'static {
    async fn fetch(&self, key: &str) -> shared::Result<Bytes>;
}
