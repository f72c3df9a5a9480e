use std::env;
use std::time::Duration;

use crate::cache::{DEFAULT_SWEEP_INTERVAL, DEFAULT_TTL};
use crate::fetcher::{DEFAULT_MAX_BODY_BYTES, DEFAULT_USER_AGENT};
use crate::rate_limit::{DEFAULT_BURST, DEFAULT_PER_SECOND};

#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub user_agent: String,
    /// Unset means outbound fetches have no timeout.
    pub fetch_timeout: Option<Duration>,
    pub cache_ttl: Duration,
    pub cache_sweep_interval: Duration,
    pub rate_limit_per_second: u32,
    pub rate_limit_burst: u32,
    /// Cap on bytes read from each fetched page.
    pub max_body_bytes: usize,
    /// Selects JSON log output.
    pub is_production: bool,
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let user_agent = lookup("LINK2JSON_USER_AGENT")
            .filter(|ua| !ua.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

        let number = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());
        let positive = |key: &str, default: u64| number(key).filter(|n| *n > 0).unwrap_or(default);

        Config {
            server_host: lookup("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            server_port: lookup("SERVER_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            user_agent,
            fetch_timeout: number("FETCH_TIMEOUT_SECS")
                .filter(|n| *n > 0)
                .map(Duration::from_secs),
            cache_ttl: Duration::from_secs(positive("CACHE_TTL_SECS", DEFAULT_TTL.as_secs())),
            cache_sweep_interval: Duration::from_secs(positive(
                "CACHE_SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL.as_secs(),
            )),
            rate_limit_per_second: u32::try_from(positive(
                "RATE_LIMIT_PER_SECOND",
                DEFAULT_PER_SECOND.into(),
            ))
            .unwrap_or(DEFAULT_PER_SECOND),
            rate_limit_burst: u32::try_from(positive("RATE_LIMIT_BURST", DEFAULT_BURST.into()))
                .unwrap_or(DEFAULT_BURST),
            max_body_bytes: usize::try_from(positive(
                "MAX_BODY_BYTES",
                DEFAULT_MAX_BODY_BYTES as u64,
            ))
            .unwrap_or(DEFAULT_MAX_BODY_BYTES),
            is_production: lookup("APP_ENV").as_deref() == Some("production"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    /// Config is read before the subscriber exists, so the user agent
    /// choice is reported separately once logging is up.
    pub fn log_user_agent(&self) {
        if self.user_agent == DEFAULT_USER_AGENT {
            tracing::warn!("User agent not set, using default");
        } else {
            tracing::info!("User agent set to: {}", self.user_agent);
        }
    }
}
