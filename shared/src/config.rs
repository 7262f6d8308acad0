use std::time::Duration;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("required environment variable {0} is not set")]
    Missing(&'static str),
    #[error("environment variable {0} has invalid value {1:?} (expected an integer)")]
    Invalid(&'static str, String),
}

#[derive(Debug)]
pub struct Config {
    pub host: String,
    pub http_port: u16,
    pub cache_ttl: Duration,
    pub wait_between_calls: Duration,
    pub markets_url: String,
}

impl Config {
    const DEFAULT_HOST: &str = "0.0.0.0";
    const DEFAULT_HTTP_PORT: u16 = 8080;
    const DEFAULT_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

    /// Load configuration from process environment variables.
    /// CACHE_TTL_SECS and WAIT_BETWEEN_CALLS_SECS are required; a missing or
    /// non-integer value is a startup failure, never a per-request condition.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(|name| std::env::var(name).ok())
    }

    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cache_ttl_secs = required_secs("CACHE_TTL_SECS", lookup("CACHE_TTL_SECS"))?;
        let wait_secs = required_secs("WAIT_BETWEEN_CALLS_SECS", lookup("WAIT_BETWEEN_CALLS_SECS"))?;

        let host = lookup("MARKET_HOST").unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        let http_port = match lookup("MARKET_HTTP_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("MARKET_HTTP_PORT", raw))?,
            None => Self::DEFAULT_HTTP_PORT,
        };

        Ok(Self {
            host,
            http_port,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            wait_between_calls: Duration::from_secs(wait_secs),
            markets_url: lookup("MARKETS_URL")
                .unwrap_or_else(|| Self::DEFAULT_MARKETS_URL.to_string()),
        })
    }
}

fn required_secs(name: &'static str, raw: Option<String>) -> Result<u64, ConfigError> {
    let raw = raw.ok_or(ConfigError::Missing(name))?;
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::Invalid(name, raw))
}
