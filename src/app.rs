use axum::{routing::get, Router};
use governor::clock::Clock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers;
use crate::state::AppState;

/// Build the application router. Cross-origin requests are allowed from any
/// origin.
pub fn router<C>(state: AppState<C>) -> Router
where
    C: Clock + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(handlers::health_check::<C>))
        .route("/extract", get(handlers::extract::extract_metadata::<C>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
