pub mod extract;

use axum::{extract::State, Json};
use governor::clock::Clock;
use serde_json::{json, Value};

use crate::state::AppState;

pub async fn health_check<C>(State(state): State<AppState<C>>) -> Json<Value>
where
    C: Clock + Send + Sync + 'static,
{
    Json(json!({
        "status": "ok",
        "service": "link2json-server",
        "version": env!("CARGO_PKG_VERSION"),
        "cached_entries": state.fetcher.cache().len(),
    }))
}
