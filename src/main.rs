mod config;
mod models;
mod routes;
mod services;

use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::aggregator::Aggregator;
use crate::services::upstream::{RetryPolicy, UpstreamClient};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub aggregator: Aggregator,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "panstream_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting PanStream Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.node_env);
    tracing::info!("Upstream catalog: {}", config.upstream_base_url);

    // Initialize the resilient upstream client and the fan-out orchestrator
    let policy = RetryPolicy::new(
        Duration::from_millis(config.fetch_timeout_ms),
        config.fetch_max_attempts,
        Duration::from_millis(config.fetch_backoff_base_ms),
    );
    let client = UpstreamClient::new(&config.upstream_base_url, &config.user_agent, policy);
    let aggregator = Aggregator::new(client, config.feed_page_size);

    // Build application state
    let state = Arc::new(AppState {
        config,
        aggregator,
        start_time: Instant::now(),
    });

    // Build router
    let app = Router::new()
        // Health endpoints
        .route("/", get(routes::health::root))
        .route("/health", get(routes::health::health_check))
        // Aggregate feed + search
        .route("/api/feed", get(routes::feed::get_feed))
        .route("/api/search", get(routes::feed::search))
        .route("/api/populersearch", get(routes::feed::popular_search))
        // Single-title player payload
        .route("/api/drama/:book_id", get(routes::watch::get_drama))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
