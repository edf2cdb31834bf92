mod api;
mod config;
mod error;
mod frontend;
mod models;
mod services;
mod views;

use crate::api::AppState;
use crate::config::Config;
use crate::services::{session_layer, RelayClient, ReportExporter, S3ObjectStore, SpotifyClient};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,spotify_stats=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // One HTTP client shared by the Spotify and relay clients
    let http = reqwest::Client::builder()
        .user_agent(concat!("spotify-stats/", env!("CARGO_PKG_VERSION")))
        .build()?;

    let spotify = Arc::new(SpotifyClient::new(&config, http.clone()));
    let relay = Arc::new(RelayClient::new(config.aggregation_url.clone(), http));

    let store = Arc::new(S3ObjectStore::from_env().await);
    tracing::info!("Object storage ready, reports go to bucket {}", config.s3_bucket);

    let exporter = Arc::new(ReportExporter::new(
        store,
        config.s3_bucket.clone(),
        config.report_prefix.clone(),
    ));

    let app_state = Arc::new(AppState {
        spotify,
        relay,
        exporter,
    });

    // Tokens live until the browser session ends or the store evicts them
    let (_, sessions) = session_layer(config.session_capacity, config.session_secure_cookie);
    tracing::info!("Session store holds up to {} sessions", config.session_capacity);

    let app = api::router(app_state)
        .layer(sessions)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = format!("{}:{}", config.server_host, config.server_port);
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
