//! smartfeed binary entrypoint
//! Loads config, wires cache + providers + aggregator, and serves the read API.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use smartfeed::telemetry::Metrics;
use smartfeed::{api, build_service, ArticleSet, FeedConfig, InMemoryCache};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("smartfeed=info,tower_http=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op when absent.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = FeedConfig::load().context("loading feed config")?;
    info!(
        bind = %cfg.bind_addr,
        provider_limit = cfg.provider_limit,
        ttl_secs = cfg.cache_ttl_secs,
        "config loaded"
    );

    let cache: Arc<InMemoryCache<ArticleSet>> = Arc::new(InMemoryCache::new());
    let _sweeper = Arc::clone(&cache).spawn_sweeper(cfg.sweep_interval());

    // Recorder first, so series described while wiring the service land on it.
    let metrics = if cfg.metrics_enabled {
        Some(Metrics::init(cfg.cache_ttl_secs)?)
    } else {
        None
    };

    let service = Arc::new(build_service(&cfg, cache)?);
    let state = api::AppState::new(service, cfg.default_interests.clone());

    let mut app = api::router(state);
    if let Some(metrics) = &metrics {
        app = app.merge(metrics.router());
    }

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    info!(addr = %cfg.bind_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown requested");
        })
        .await
        .context("serving http")?;

    Ok(())
}
