// src/ingest/providers/dev_to.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use metrics::counter;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::ingest::types::{prefixed_id, Article, ArticleProvider};
use crate::ingest::{get_json, trim_base};

pub const DEFAULT_BASE_URL: &str = "https://dev.to/api";
const SOURCE: &str = "DEV.to";
const ID_PREFIX: &str = "dev";

#[derive(Debug, Deserialize)]
struct DevArticle {
    id: u64,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    user: User,
    #[serde(default)]
    positive_reactions_count: i64,
    #[serde(default, deserialize_with = "tag_list")]
    tag_list: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct User {
    #[serde(default)]
    name: String,
}

/// The list endpoint sends `tag_list` as an array; single-article payloads send
/// a comma-separated string. Accept both.
fn tag_list<'de, D: Deserializer<'de>>(d: D) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Tags {
        List(Vec<String>),
        Csv(String),
    }
    let tags = match Option::<Tags>::deserialize(d)? {
        Some(Tags::List(v)) => v,
        Some(Tags::Csv(s)) => s.split(',').map(|t| t.trim().to_string()).collect(),
        None => Vec::new(),
    };
    Ok(tags.into_iter().filter(|t| !t.is_empty()).collect())
}

/// RFC 3339 → UTC; anything unparsable becomes unix zero instead of dropping the item.
fn parse_rfc3339(ts: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(ts)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

impl DevArticle {
    fn into_article(self) -> Article {
        Article {
            id: prefixed_id(ID_PREFIX, self.id),
            title: self.title,
            url: self.url,
            author: self.user.name,
            source: SOURCE.to_string(),
            score: self.positive_reactions_count,
            created_at: self
                .published_at
                .as_deref()
                .map(parse_rfc3339)
                .unwrap_or_default(),
            tags: self.tag_list,
        }
    }
}

/// Paged list: one call returns fully populated articles.
pub struct DevToProvider {
    client: reqwest::Client,
    base_url: String,
}

impl DevToProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }
}

#[async_trait]
impl ArticleProvider for DevToProvider {
    async fn fetch_articles(
        &self,
        cancel: &CancellationToken,
        limit: usize,
    ) -> Result<Vec<Article>> {
        let url = format!("{}/articles?top=1&per_page={limit}", self.base_url);
        // Only the page shape is fatal; a malformed element is skipped.
        let page: Vec<Value> = get_json(&self.client, &url, cancel)
            .await
            .context("dev.to articles")?;

        let out: Vec<Article> = page
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<DevArticle>(raw) {
                Ok(a) => Some(a.into_article()),
                Err(e) => {
                    tracing::debug!(target: "ingest", provider = self.name(), error = %e, "skipping item");
                    counter!("feed_items_skipped_total", "provider" => self.name()).increment(1);
                    None
                }
            })
            .take(limit)
            .collect();

        tracing::debug!(target: "ingest", provider = self.name(), count = out.len(), "fetched");
        Ok(out)
    }

    fn name(&self) -> &'static str {
        "dev_to"
    }
}
