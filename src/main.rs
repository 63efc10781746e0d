use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use skyquest_tracker::{
    api::{create_router, AppState},
    cache::Cache,
    config::Config,
    services::{DecisionTreeClassifier, EventStore, NasaFeed},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skyquest_tracker=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    // Both artifacts must load before the listener binds
    let classifier = DecisionTreeClassifier::load(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path))?;
    let store = EventStore::load(&config.events_path)
        .with_context(|| format!("Failed to load events from {}", config.events_path))?;

    let cache = Cache::new();
    let feed = NasaFeed::new(
        cache.clone(),
        config.nasa_api_key.clone(),
        config.nasa_api_url.clone(),
        config.external_timeout(),
        config.cache_ttl(),
    )
    .context("Failed to build NASA feed client")?;

    if config.uses_demo_key() {
        tracing::warn!("NASA_API_KEY not set, using DEMO_KEY (heavily rate limited)");
    }

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(
        config,
        Arc::new(classifier),
        Arc::new(store),
        Arc::new(feed),
        cache,
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "SkyQuest Tracker listening");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
