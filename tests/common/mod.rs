// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use governor::clock::{Clock, FakeRelativeClock};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use link2json_server::{
    app,
    cache::ResponseCache,
    fetcher::{build_client, MetadataFetcher},
    rate_limit::RequestLimiter,
    state::AppState,
};

pub const TEST_USER_AGENT: &str = "link2json-test/1.0";

/// Burst large enough that ordinary tests never hit the limiter.
pub const GENEROUS_BURST: u32 = 1_000;

fn state_with_clock<C: Clock>(clock: &C, per_second: u32, burst: u32) -> AppState<C> {
    let client = build_client(TEST_USER_AGENT, Some(Duration::from_secs(5)))
        .expect("Failed to build test HTTP client");
    let cache = Arc::new(ResponseCache::with_clock(
        Duration::from_secs(1800),
        Duration::from_secs(3600),
        clock.clone(),
    ));
    AppState::new(
        MetadataFetcher::new(client, cache),
        RequestLimiter::with_clock(per_second, burst, clock),
    )
}

/// Router with a real clock and a limiter that stays out of the way.
pub fn create_test_app() -> Router {
    let clock = governor::clock::DefaultClock::default();
    app::router(state_with_clock(&clock, 1, GENEROUS_BURST))
}

/// Router whose limiter and cache run on `clock`, with the default
/// 1 token/s refill and burst of 3.
pub fn create_fake_clock_app(clock: &FakeRelativeClock) -> Router {
    app::router(state_with_clock(clock, 1, 3))
}

/// `/extract?url=<target>` with `target` percent-encoded.
pub fn extract_uri(target: &str) -> String {
    format!("/extract?url={}", urlencoding::encode(target))
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let (status, _, body) = get_with_headers(app, uri, &[]).await;
    (status, body)
}

pub async fn get_with_headers(
    app: Router,
    uri: &str,
    headers: &[(header::HeaderName, &str)],
) -> (StatusCode, HeaderMap, Value) {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    for (name, value) in headers {
        builder = builder.header(name, *value);
    }
    let req = builder.body(Body::empty()).unwrap();

    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

/// A page that declares its own site name, so no fallback fetch happens.
pub fn page_html(title: &str, description: &str) -> String {
    format!(
        r#"<!doctype html>
<html>
  <head>
    <title>{title}</title>
    <meta name="description" content="{description}">
    <meta property="og:site_name" content="Fixture Site">
    <link rel="icon" href="/favicon.ico">
  </head>
  <body><p>{title}</p></body>
</html>"#
    )
}
