use application::ports::MarketDataSource;
use application::Application;
use shared::config::Config;
use std::sync::Arc;
use storage_engine::MemoryPageCache;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub app: Application,
    pub markets_url: String,
}

impl AppState {
    pub fn new(config: &Config, source: Arc<dyn MarketDataSource>) -> Self {
        let cache = Arc::new(MemoryPageCache::new());
        Self {
            app: Application::new(
                cache,
                source,
                config.cache_ttl,
                config.wait_between_calls,
            ),
            markets_url: config.markets_url.clone(),
        }
    }
}
