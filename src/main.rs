use std::sync::Arc;

use axum::routing::get;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

use link2json_server::app;
use link2json_server::config::Config;
use link2json_server::state::AppState;

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // Initialize tracing — JSON in production, human-readable in dev.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link2json_server=info,tower_http=info"));

    if config.is_production {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("link2json server starting...");

    config.log_user_agent();
    info!(
        timeout = ?config.fetch_timeout,
        max_body_bytes = config.max_body_bytes,
        cache_ttl = ?config.cache_ttl,
        per_second = config.rate_limit_per_second,
        burst = config.rate_limit_burst,
        "Configuration loaded"
    );

    let app_state = AppState::from_config(&config).expect("Failed to build HTTP client");
    let sweeper = Arc::clone(app_state.fetcher.cache()).spawn_sweeper();

    // Prometheus metrics layer
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = app::router(app_state)
        .route(
            "/metrics",
            get(move || async move { metric_handle.render() }),
        )
        .layer(prometheus_layer);

    let addr = config.server_addr();
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server failed to start");

    sweeper.abort();
    info!("Server stopped");
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = ?e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
