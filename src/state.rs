use std::sync::Arc;

use governor::clock::{Clock, DefaultClock};

use crate::cache::ResponseCache;
use crate::config::Config;
use crate::fetcher::{build_client, MetadataFetcher};
use crate::rate_limit::RequestLimiter;

/// Shared application state passed to all handlers.
/// The limiter and cache are built once at startup and shared by every
/// request; tests build them with a fake clock instead.
#[derive(Clone)]
pub struct AppState<C: Clock = DefaultClock> {
    pub fetcher: Arc<MetadataFetcher<C>>,
    pub limiter: Arc<RequestLimiter<C>>,
}

impl<C: Clock> AppState<C> {
    pub fn new(fetcher: MetadataFetcher<C>, limiter: RequestLimiter<C>) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            limiter: Arc::new(limiter),
        }
    }
}

impl AppState<DefaultClock> {
    pub fn from_config(config: &Config) -> reqwest::Result<Self> {
        let client = build_client(&config.user_agent, config.fetch_timeout)?;
        let cache = Arc::new(ResponseCache::new(
            config.cache_ttl,
            config.cache_sweep_interval,
        ));

        Ok(Self::new(
            MetadataFetcher::new(client, cache).with_max_body_bytes(config.max_body_bytes),
            RequestLimiter::new(config.rate_limit_per_second, config.rate_limit_burst),
        ))
    }
}
