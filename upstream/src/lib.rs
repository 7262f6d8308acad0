// upstream/src/lib.rs

use application::ports::MarketDataSource;
use async_trait::async_trait;
use bytes::Bytes;
use shared::{Error, Result};
use tracing::debug;

/// Build the full provider URL for one page of the markets listing. The
/// returned string is also the cache key for that page.
pub fn page_url(markets_url: &str, page: u32) -> String {
    format!(
        "{markets_url}?vs_currency=usd&order=market_cap_desc&per_page=250&sparkline=false&page={page}"
    )
}

/// HTTP adapter for the market-data provider. The body is passed through as
/// opaque bytes; any non-2xx status or transport failure is an error for the
/// coordinator to absorb.
pub struct HttpMarketSource {
    client: reqwest::Client,
}

impl HttpMarketSource {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpMarketSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataSource for HttpMarketSource {
    async fn fetch(&self, key: &str) -> Result<Bytes> {
        debug!(url = key, "issuing upstream request");
        let response = self
            .client
            .get(key)
            .send()
            .await
            .map_err(|err| Error::UpstreamTransport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        response
            .bytes()
            .await
            .map_err(|err| Error::UpstreamTransport(err.to_string()))
    }
}
