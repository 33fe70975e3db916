use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use season_scout::{
    api::{create_router, AppState},
    config::Config,
    db::{create_redis_client, Cache},
    services::AniListProvider,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let (cache, cache_writer) = match config.redis_url.as_deref() {
        Some(url) => {
            let client = create_redis_client(url)?;
            let (cache, writer) = Cache::new(client).await;
            (cache, Some(writer))
        }
        None => {
            tracing::info!("REDIS_URL not set, season catalog caching disabled");
            (Cache::disabled(), None)
        }
    };

    tracing::info!(cache_enabled = cache.is_enabled(), "Season catalog cache ready");

    let provider = AniListProvider::new(
        cache,
        config.anilist_api_url.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;

    let state = AppState::from_config(Arc::new(provider), &config);
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    tracing::info!(
        address = %addr,
        anilist_api_url = %config.anilist_api_url,
        report_dir = %config.report_dir.display(),
        write_reports = config.write_reports,
        "Server running"
    );

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
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
