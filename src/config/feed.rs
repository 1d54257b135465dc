// src/config/feed.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::ingest::providers::{dev_to, hacker_news};

pub const ENV_CONFIG_PATH: &str = "FEED_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/feed.toml";

const ENV_PORT: &str = "PORT";
const ENV_CACHE_TTL_SECS: &str = "FEED_CACHE_TTL_SECS";
const ENV_PROVIDER_LIMIT: &str = "FEED_PROVIDER_LIMIT";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeedConfig {
    pub bind_addr: String,
    /// Upper bound on articles requested from each provider.
    pub provider_limit: usize,
    /// Freshness window of the merged article set.
    pub cache_ttl_secs: u64,
    pub latest_limit: usize,
    pub recommended_limit: usize,
    pub http_timeout_secs: u64,
    pub sweep_interval_secs: u64,
    /// Parallel item fetches inside the Hacker News provider.
    pub item_concurrency: usize,
    pub hacker_news_base_url: String,
    pub dev_to_base_url: String,
    /// Used by /recommended when the request carries no interests.
    pub default_interests: Vec<String>,
    pub metrics_enabled: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            provider_limit: 100,
            cache_ttl_secs: 300,
            latest_limit: 30,
            recommended_limit: 30,
            http_timeout_secs: 10,
            sweep_interval_secs: 3600,
            item_concurrency: 8,
            hacker_news_base_url: hacker_news::DEFAULT_BASE_URL.to_string(),
            dev_to_base_url: dev_to::DEFAULT_BASE_URL.to_string(),
            default_interests: vec!["Network".to_string(), "Go".to_string()],
            metrics_enabled: true,
        }
    }
}

impl FeedConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading feed config from {}", path.display()))?;
        let cfg: FeedConfig = toml::from_str(&content)
            .with_context(|| format!("parsing feed config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks, then apply env overrides:
    /// 1) $FEED_CONFIG_PATH
    /// 2) config/feed.toml
    /// 3) built-in defaults
    pub fn load() -> Result<Self> {
        let cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else {
            let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default_p.exists() {
                Self::load_from_file(&default_p)?
            } else {
                Self::default()
            }
        };
        cfg.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(port) = std::env::var(ENV_PORT) {
            let port: u16 = port
                .trim()
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number"))?;
            let host = self
                .bind_addr
                .rsplit_once(':')
                .map(|(h, _)| h.to_string())
                .unwrap_or_else(|| "0.0.0.0".to_string());
            self.bind_addr = format!("{host}:{port}");
        }
        if let Some(v) = parse_env::<u64>(ENV_CACHE_TTL_SECS)? {
            self.cache_ttl_secs = v;
        }
        if let Some(v) = parse_env::<usize>(ENV_PROVIDER_LIMIT)? {
            self.provider_limit = v;
        }
        Ok(self.sanitized())
    }

    fn sanitized(mut self) -> Self {
        self.provider_limit = self.provider_limit.max(1);
        self.cache_ttl_secs = self.cache_ttl_secs.max(1);
        self.item_concurrency = self.item_concurrency.max(1);
        self.http_timeout_secs = self.http_timeout_secs.max(1);
        self.sweep_interval_secs = self.sweep_interval_secs.max(1);
        self.default_interests = self
            .default_interests
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        self
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{name} has an invalid value: {raw}")),
        Err(_) => Ok(None),
    }
}
