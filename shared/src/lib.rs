// shared/src/lib.rs

use std::time::Duration;

use bytes::Bytes;
use tokio::time::Instant;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("upstream returned HTTP {0}")]
    UpstreamStatus(u16),
    #[error("upstream request failed: {0}")]
    UpstreamTransport(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// One cached upstream page: the raw body plus when it was fetched.
/// The payload is opaque to the proxy; it is stored and replayed verbatim.
#[derive(Clone, Debug)]
pub struct CachedPage {
    pub payload: Bytes,
    pub fetched_at: Instant,
}

impl CachedPage {
    pub fn new(payload: Bytes, fetched_at: Instant) -> Self {
        Self { payload, fetched_at }
    }

    /// An entry is fresh while its age stays under the process-wide TTL.
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.fetched_at.elapsed() < ttl
    }
}

pub mod config;
