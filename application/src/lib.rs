// application/src/lib.rs
pub mod ports;
pub mod throttle;
pub mod usecases;

use ports::{MarketDataSource, PageCache};
use std::sync::Arc;
use std::time::Duration;
use throttle::CallSpacer;
use usecases::FetchPageUseCase;

#[derive(Clone)]
pub struct Application {
    pub fetch_page: FetchPageUseCase,
}

impl Application {
    pub fn new(
        cache: Arc<dyn PageCache>,
        source: Arc<dyn MarketDataSource>,
        cache_ttl: Duration,
        wait_between_calls: Duration,
    ) -> Self {
        let spacer = Arc::new(CallSpacer::new(wait_between_calls));
        Self {
            fetch_page: FetchPageUseCase::new(cache, source, spacer, cache_ttl),
        }
    }
}
