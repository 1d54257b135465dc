//! # Article aggregator
//!
//! Cache-aside read of the merged article set. On a miss every registered
//! provider is called concurrently (one task each, sharing a child
//! cancellation token); the first failure cancels the siblings and fails the
//! whole read without touching the cache. On success the results are merged,
//! de-duplicated by id, sorted newest first and cached for the freshness
//! window. Every other read is a view over that merged set.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::Cache;
use crate::error::{FeedError, Result};
use crate::ingest::ensure_metrics_described;
use crate::ingest::types::{Article, ArticleProvider};
use crate::recommend::recommend;
use crate::search::search_articles;

pub const ALL_ARTICLES_KEY: &str = "all_articles";
pub const DEFAULT_PROVIDER_LIMIT: usize = 100;
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DEFAULT_LATEST_LIMIT: usize = 30;
pub const DEFAULT_RECOMMENDED_LIMIT: usize = 30;
/// The merged set always expires; a zero TTL is raised to this.
pub const MIN_CACHE_TTL: Duration = Duration::from_secs(1);

/// The merged set is shared, never copied, between cache and readers.
pub type ArticleSet = Arc<Vec<Article>>;

pub type DynProvider = Arc<dyn ArticleProvider>;
pub type DynArticleCache = Arc<dyn Cache<ArticleSet>>;

#[derive(Debug, Clone, Copy)]
pub struct AggregatorLimits {
    pub provider_limit: usize,
    pub cache_ttl: Duration,
    pub latest_limit: usize,
    pub recommended_limit: usize,
}

impl Default for AggregatorLimits {
    fn default() -> Self {
        Self {
            provider_limit: DEFAULT_PROVIDER_LIMIT,
            cache_ttl: DEFAULT_CACHE_TTL,
            latest_limit: DEFAULT_LATEST_LIMIT,
            recommended_limit: DEFAULT_RECOMMENDED_LIMIT,
        }
    }
}

pub struct ArticleService {
    providers: Vec<DynProvider>,
    cache: DynArticleCache,
    limits: AggregatorLimits,
    /// Serializes the miss path so concurrent misses share one fan-out.
    refresh: tokio::sync::Mutex<()>,
}

impl ArticleService {
    pub fn new(providers: Vec<DynProvider>, cache: DynArticleCache) -> Self {
        Self::with_limits(providers, cache, AggregatorLimits::default())
    }

    pub fn with_limits(
        providers: Vec<DynProvider>,
        cache: DynArticleCache,
        mut limits: AggregatorLimits,
    ) -> Self {
        ensure_metrics_described();
        limits.cache_ttl = limits.cache_ttl.max(MIN_CACHE_TTL);
        Self {
            providers,
            cache,
            limits,
            refresh: tokio::sync::Mutex::new(()),
        }
    }

    pub fn limits(&self) -> &AggregatorLimits {
        &self.limits
    }

    /// Drop the cached merged set; the next read refetches.
    pub fn invalidate(&self) {
        self.cache.delete(ALL_ARTICLES_KEY);
    }

    /// Merged, newest-first article set. A cache hit is returned as stored.
    pub async fn get_all_articles(&self, cancel: &CancellationToken) -> Result<ArticleSet> {
        if let Some(hit) = self.cache.get(ALL_ARTICLES_KEY) {
            counter!("feed_cache_hits_total").increment(1);
            return Ok(hit);
        }

        let _guard = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FeedError::Cancelled),
            g = self.refresh.lock() => g,
        };

        // Another caller may have refreshed while we waited.
        if let Some(hit) = self.cache.get(ALL_ARTICLES_KEY) {
            counter!("feed_cache_hits_total").increment(1);
            return Ok(hit);
        }
        counter!("feed_cache_misses_total").increment(1);

        let t0 = Instant::now();
        let mut articles = self.fan_out(cancel).await?;

        let before = articles.len();
        dedup_by_id(&mut articles);
        if articles.len() < before {
            warn!(target: "feed", dropped = before - articles.len(), "duplicate article ids in merge");
        }
        // stable: equal timestamps keep provider order
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let set: ArticleSet = Arc::new(articles);
        self.cache
            .set(ALL_ARTICLES_KEY, Arc::clone(&set), self.limits.cache_ttl);

        histogram!("feed_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        gauge!("feed_merged_articles").set(set.len() as f64);
        info!(
            target: "feed",
            count = set.len(),
            providers = self.providers.len(),
            ttl_secs = self.limits.cache_ttl.as_secs(),
            "merged article set refreshed"
        );
        Ok(set)
    }

    /// One task per provider; first error cancels the shared token and shuts the set down.
    async fn fan_out(&self, cancel: &CancellationToken) -> Result<Vec<Article>> {
        let shared = cancel.child_token();
        let acc: Arc<Mutex<Vec<Article>>> = Arc::new(Mutex::new(Vec::new()));
        let limit = self.limits.provider_limit;

        let mut tasks = JoinSet::new();
        for provider in &self.providers {
            let provider = Arc::clone(provider);
            let token = shared.clone();
            let acc = Arc::clone(&acc);
            tasks.spawn(async move {
                let name = provider.name();
                match provider.fetch_articles(&token, limit).await {
                    Ok(mut fetched) => {
                        fetched.truncate(limit);
                        debug!(target: "feed", provider = name, count = fetched.len(), "provider ok");
                        acc.lock()
                            .unwrap_or_else(PoisonError::into_inner)
                            .append(&mut fetched);
                        Ok(())
                    }
                    Err(source) => {
                        token.cancel();
                        Err(FeedError::Upstream {
                            provider: name,
                            source,
                        })
                    }
                }
            });
        }

        let mut first_err: Option<FeedError> = None;
        while let Some(joined) = tasks.join_next().await {
            let res = joined.unwrap_or_else(|e| Err(FeedError::Task(e.to_string())));
            if let Err(e) = res {
                shared.cancel();
                first_err = Some(e);
                break;
            }
        }

        if let Some(err) = first_err {
            tasks.shutdown().await;
            if let FeedError::Upstream { provider, .. } = &err {
                counter!("feed_provider_errors_total", "provider" => *provider).increment(1);
            }
            if cancel.is_cancelled() {
                warn!(target: "feed", "article fetch cancelled by caller");
                return Err(FeedError::Cancelled);
            }
            warn!(target: "feed", error = %err, "aggregation failed; cache left untouched");
            return Err(err);
        }

        let merged = std::mem::take(&mut *acc.lock().unwrap_or_else(PoisonError::into_inner));
        Ok(merged)
    }

    /// First `latest_limit` articles of the merged set.
    pub async fn get_latest_articles(&self, cancel: &CancellationToken) -> Result<Vec<Article>> {
        let all = self.get_all_articles(cancel).await?;
        Ok(all
            .iter()
            .take(self.limits.latest_limit)
            .cloned()
            .collect())
    }

    pub async fn get_article_by_id(
        &self,
        cancel: &CancellationToken,
        id: &str,
    ) -> Result<Article> {
        let all = self.get_all_articles(cancel).await?;
        all.iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| FeedError::NotFound(id.to_string()))
    }

    pub async fn get_recommended_articles(
        &self,
        cancel: &CancellationToken,
        interests: &[String],
    ) -> Result<Vec<Article>> {
        let all = self.get_all_articles(cancel).await?;
        Ok(recommend(&all, interests, self.limits.recommended_limit))
    }

    pub async fn search_articles(
        &self,
        cancel: &CancellationToken,
        query: &str,
    ) -> Result<Vec<Article>> {
        let all = self.get_all_articles(cancel).await?;
        Ok(search_articles(&all, query))
    }
}

/// Keep the first occurrence of every id, preserving order.
fn dedup_by_id(articles: &mut Vec<Article>) {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    articles.retain(|a| seen.insert(a.id.clone()));
}
