use std::time::Instant;

use axum::extract::{RawQuery, State};
use axum::Json;
use governor::clock::Clock;
use url::{form_urlencoded, Url};

use crate::error::{AppError, AppResult};
use crate::models::MetadataRecord;
use crate::state::AppState;

// ── Query params ───────────────────────────────────────────────────────────

/// First `url` value in the query string. Repeated keys are not an error;
/// later values are ignored.
pub fn url_param(query: Option<&str>) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "url")
        .map(|(_, value)| value.into_owned())
}

/// The requested URL must be present and an absolute http(s) URL with a host.
pub fn validate_url(raw: Option<&str>) -> AppResult<&str> {
    let raw = raw
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("URL parameter is required".into()))?;

    let parsed = Url::parse(raw).map_err(|_| AppError::Validation("Invalid URL".into()))?;
    let supported = matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some();
    if !supported {
        return Err(AppError::Validation("Invalid URL".into()));
    }

    Ok(raw)
}

// ── Handler ────────────────────────────────────────────────────────────────

/// GET /extract?url=<encoded-url>
///
/// Admission is checked before anything else, so a rejected request does no
/// validation work and no I/O. The record is cached under the URL exactly
/// as given; `duration` is always the time spent on this request. The raw
/// query is taken so that no query string is rejected ahead of the limiter.
pub async fn extract_metadata<C>(
    State(state): State<AppState<C>>,
    RawQuery(query): RawQuery,
) -> AppResult<Json<MetadataRecord>>
where
    C: Clock + Send + Sync + 'static,
{
    if !state.limiter.allow() {
        return Err(AppError::RateLimited);
    }

    let started = Instant::now();
    let requested = url_param(query.as_deref());
    let url = validate_url(requested.as_deref())?;

    let mut record = state.fetcher.fetch(url).await?;
    record.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    Ok(Json(record))
}

// ── Unit tests ─────────────────────────────────────────────────────────────
