// src/ingest/providers/hacker_news.rs
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use metrics::counter;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::ingest::types::{prefixed_id, Article, ArticleProvider};
use crate::ingest::{get_json, trim_base};

pub const DEFAULT_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";
const SOURCE: &str = "Hacker News";
const ID_PREFIX: &str = "hn";

#[derive(Debug, Deserialize)]
struct Item {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    score: Option<i64>,
    #[serde(default)]
    by: Option<String>,
    #[serde(default)]
    time: Option<i64>,
}

impl Item {
    fn into_article(self) -> Article {
        let url = self
            .url
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| format!("https://news.ycombinator.com/item?id={}", self.id));
        Article {
            id: prefixed_id(ID_PREFIX, self.id),
            title: self.title.unwrap_or_default(),
            url,
            author: self.by.unwrap_or_default(),
            source: SOURCE.to_string(),
            score: self.score.unwrap_or(0),
            created_at: self
                .time
                .and_then(|t| DateTime::<Utc>::from_timestamp(t, 0))
                .unwrap_or_default(),
            tags: Vec::new(),
        }
    }
}

/// Listing + per-item detail: `topstories.json` yields ordered ids, each id is
/// fetched from `item/{id}.json`.
pub struct HackerNewsProvider {
    client: reqwest::Client,
    base_url: String,
    concurrency: usize,
}

impl HackerNewsProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, concurrency: usize) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
            concurrency: concurrency.max(1),
        }
    }

    async fn fetch_item(&self, id: u64, cancel: &CancellationToken) -> Result<Article> {
        let url = format!("{}/item/{id}.json", self.base_url);
        // Deleted/dead items come back as a literal `null`.
        let item: Option<Item> = get_json(&self.client, &url, cancel).await?;
        match item {
            Some(it) => Ok(it.into_article()),
            None => bail!("item {id} is null"),
        }
    }
}

#[async_trait]
impl ArticleProvider for HackerNewsProvider {
    async fn fetch_articles(
        &self,
        cancel: &CancellationToken,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let url = format!("{}/topstories.json", self.base_url);
        let ids: Vec<u64> = get_json(&self.client, &url, cancel)
            .await
            .context("hacker news top stories")?;

        // `buffered` keeps listing order while running a bounded number of requests.
        let results: Vec<(u64, Result<Article>)> = stream::iter(ids.into_iter().take(limit))
            .map(|id| async move { (id, self.fetch_item(id, cancel).await) })
            .buffered(self.concurrency)
            .collect()
            .await;

        if cancel.is_cancelled() {
            bail!("hacker news fetch cancelled");
        }

        let mut out = Vec::with_capacity(results.len());
        for (id, res) in results {
            match res {
                Ok(article) => out.push(article),
                Err(e) => {
                    tracing::debug!(target: "ingest", error = %format!("{e:#}"), id, "skipping hacker news item");
                    counter!("feed_items_skipped_total", "provider" => self.name()).increment(1);
                }
            }
        }

        tracing::debug!(target: "ingest", provider = self.name(), count = out.len(), "fetched");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "hacker_news"
    }
}
