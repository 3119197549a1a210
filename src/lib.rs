pub mod config;
pub mod lookup;
pub mod server;

use anyhow::Context;
use tokio::signal;

use config::AppConfig;
use server::{build_router, AppState};

/// Serve the title API until Ctrl+C
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(&config)
        .await
        .context("initializing extractors")?;

    tracing::info!(
        strategies = ?state.orchestrator.strategy_names(),
        cache_ttl_ms = config.cache_ttl_ms,
        cookies = state.orchestrator.env().cookies_path.is_some(),
        "title lookup ready"
    );
    for ext in state.extractors.iter() {
        tracing::info!(
            backend = %ext.backend,
            name = ext.name,
            available = ext.available,
            "extractor"
        );
    }

    let app = build_router(state, &config.lookup_path);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding to {}", addr))?;
    tracing::info!(
        "listening on http://{}{}?url=<video url>",
        addr,
        config.lookup_path
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("running API server")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install Ctrl+C handler");
    }
    tracing::info!("shutting down");
}
