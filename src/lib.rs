// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod aggregator;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod ingest;
pub mod telemetry;
pub mod recommend;
pub mod search;

// ---- Re-exports for stable public API ----
pub use crate::aggregator::{AggregatorLimits, ArticleService, ArticleSet, ALL_ARTICLES_KEY};
pub use crate::api::router;
pub use crate::cache::{Cache, InMemoryCache};
pub use crate::config::FeedConfig;
pub use crate::error::FeedError;
pub use crate::ingest::types::{Article, ArticleProvider};

use std::sync::Arc;

use crate::ingest::providers::{DevToProvider, HackerNewsProvider};

/// Build the production service from config: one shared HTTP client, both
/// upstream providers and the given cache.
pub fn build_service(
    cfg: &FeedConfig,
    cache: Arc<InMemoryCache<ArticleSet>>,
) -> anyhow::Result<ArticleService> {
    let client = ingest::http_client(cfg.http_timeout())?;

    let providers: Vec<aggregator::DynProvider> = vec![
        Arc::new(HackerNewsProvider::new(
            client.clone(),
            cfg.hacker_news_base_url.clone(),
            cfg.item_concurrency,
        )),
        Arc::new(DevToProvider::new(client, cfg.dev_to_base_url.clone())),
    ];

    let limits = AggregatorLimits {
        provider_limit: cfg.provider_limit,
        cache_ttl: cfg.cache_ttl(),
        latest_limit: cfg.latest_limit,
        recommended_limit: cfg.recommended_limit,
    };

    Ok(ArticleService::with_limits(providers, cache, limits))
}
