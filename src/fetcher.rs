//! Fetches a page, extracts its metadata and remembers the result.

use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use reqwest::Client as ReqwestClient;
use tracing::{debug, error, info};
use url::Url;

use crate::cache::ResponseCache;
use crate::error::FetchError;
use crate::extractor::{extract_metadata, Extractor};
use crate::models::MetadataRecord;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/58.0.3029.110 Safari/537.3";

/// Bytes of page body read per fetch. Anything past this is never downloaded.
pub const DEFAULT_MAX_BODY_BYTES: usize = 5 * 1024 * 1024;

/// Build the outbound client. `timeout` of `None` leaves requests unbounded.
pub fn build_client(
    user_agent: &str,
    timeout: Option<Duration>,
) -> reqwest::Result<ReqwestClient> {
    let mut builder = ReqwestClient::builder().user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// `scheme://host[:port]` of `url`, or an empty string if it has no host.
pub fn base_domain(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let Some(host) = parsed.host_str() else {
        return String::new();
    };

    match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    }
}

pub struct MetadataFetcher<C: Clock = DefaultClock> {
    client: ReqwestClient,
    cache: Arc<ResponseCache<C>>,
    max_body_bytes: usize,
}

impl<C: Clock> MetadataFetcher<C> {
    pub fn new(client: ReqwestClient, cache: Arc<ResponseCache<C>>) -> Self {
        Self {
            client,
            cache,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Read at most `limit` bytes of each page. The metadata lives in
    /// `<head>`, so a truncated body still extracts.
    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    pub fn cache(&self) -> &Arc<ResponseCache<C>> {
        &self.cache
    }

    /// Metadata for `url`, served from the cache when possible.
    ///
    /// On a miss the page is fetched and scanned. If it declares no
    /// `og:site_name`, the domain root is fetched once and its `og:title`
    /// is used instead. Either fetch failing fails the whole call and
    /// nothing is cached.
    pub async fn fetch(&self, url: &str) -> Result<MetadataRecord, FetchError> {
        if let Some(record) = self.cache.get(url) {
            debug!(%url, "Cache hit");
            return Ok(record);
        }

        let domain = base_domain(url);

        let html = self.get_html(url).await.map_err(|e| {
            error!(error = %e, "Failed to visit URL");
            e
        })?;
        let mut record = extract_metadata(&html, url, &domain);
        info!(%url, "Scraping finished");

        if record.site_name.is_empty() && !domain.is_empty() {
            let root = self.get_html(&domain).await.map_err(|e| {
                error!(error = %e, "Failed to visit base domain");
                e
            })?;
            record.site_name = Extractor::site_name_fallback().scan(&root).site_name;
        }

        self.cache.set(url, record.clone());

        Ok(record)
    }

    async fn get_html(&self, url: &str) -> Result<String, FetchError> {
        info!(%url, "Visiting");

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let mut body: Vec<u8> = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })? {
            let room = self.max_body_bytes - body.len();
            if chunk.len() >= room {
                body.extend_from_slice(&chunk[..room]);
                debug!(%url, limit = self.max_body_bytes, "Body truncated at limit");
                break;
            }
            body.extend_from_slice(&chunk);
        }

        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
