use std::sync::Arc;

use anyhow::Context;
use reqwest::Client as HttpClient;
use tracing_subscriber::EnvFilter;

use recommendations_feed::api::{create_router, AppState};
use recommendations_feed::config::Config;
use recommendations_feed::db::CacheStore;
use recommendations_feed::services::{FetchPipeline, HttpSource, PresentationContext};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recommendations_feed=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let store = match &config.cache_dir {
        Some(dir) => CacheStore::new(dir),
        None => CacheStore::in_user_data_dir()
            .context("No per-user data directory available; set CACHE_DIR")?,
    };
    tracing::info!(path = %store.path().display(), "Using recommendation cache");

    let http_client = HttpClient::new();
    let state = AppState::with_client(http_client.clone())
        .allow_private_image_hosts(config.allow_private_image_hosts);

    // Snapshots reach the display state only through the presentation task
    let (presentation, presentation_handle) = PresentationContext::spawn(state.clone());

    let source = HttpSource::with_client(http_client, config.recommendations_url.clone());
    let pipeline = FetchPipeline::new(
        Arc::new(source),
        store,
        presentation,
        config.recommendation_limit,
    );
    let _refresh = pipeline.start();

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address()))?;
    tracing::info!(address = %config.bind_address(), "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    presentation_handle.shutdown().await?;
    Ok(())
}
