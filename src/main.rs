//! beststories server entry point.
//!
//! Bootstraps logging and configuration, wires the cache store and
//! upstream client into the story service, and serves the HTTP API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use beststories::http::{router, AppState};
use beststories::{
    CacheStore, Config, HashMapStore, HashMapStoreConfig, HnClient, MetricsStore, MokaStore,
    MokaStoreConfig, StoreBackend, StoryService, TracingSink,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env();
    config.validate()?;

    let inner: Arc<dyn CacheStore> = match config.store_backend {
        StoreBackend::HashMap => Arc::new(HashMapStore::new(HashMapStoreConfig::default())),
        StoreBackend::Moka => Arc::new(MokaStore::new(MokaStoreConfig::default())),
    };
    let store: Arc<dyn CacheStore> = Arc::new(MetricsStore::new(inner, Arc::new(TracingSink)));

    let upstream = Arc::new(HnClient::new(&config)?);
    let service = Arc::new(StoryService::new(
        store,
        upstream,
        config.list_ttl,
        config.story_ttl,
    ));

    let app = router(AppState { service });

    let addr = config.bind_addr()?;
    tracing::info!(%addr, upstream = %config.upstream_url, "starting beststories server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    tracing::info!("shutdown signal received");
}
