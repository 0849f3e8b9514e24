use std::{sync::Arc, time::Duration};

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use streamfinder_api::{
    config::Config,
    db::{self, MemoryWatchlistStore, PgWatchlistStore, WatchlistStore},
    routes::{create_router, AppState},
    services::providers::{CachedProvider, MetadataProvider, TmdbProvider},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("streamfinder_api=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let streaming = config.streaming()?;

    tracing::info!(
        region = %streaming.watch_region,
        priced_providers = streaming.provider_prices.len(),
        "Configuration loaded"
    );

    let tmdb = TmdbProvider::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        Duration::from_secs(config.tmdb_timeout_secs),
    )
    .context("Failed to build TMDB client")?;

    // Provider responses are cached only when Redis is configured
    let mut cache_writer = None;
    let provider: Arc<dyn MetadataProvider> = match &config.redis_url {
        Some(url) => {
            let client = db::create_redis_client(url)?;
            let (cache, writer) = db::Cache::connect(client)
                .await
                .context("Failed to connect to Redis")?;
            cache_writer = Some(writer);
            tracing::info!("Redis cache enabled");
            Arc::new(CachedProvider::new(Arc::new(tmdb), cache))
        }
        None => Arc::new(tmdb),
    };

    let store: Arc<dyn WatchlistStore> = match &config.database_url {
        Some(url) => {
            let pool = db::create_pool(url).await?;
            tracing::info!("Using PostgreSQL watchlist store");
            Arc::new(PgWatchlistStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, watchlist is kept in memory");
            Arc::new(MemoryWatchlistStore::new())
        }
    };

    let app = create_router(AppState::new(store, provider, streaming));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(writer) = cache_writer {
        writer.shutdown().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
