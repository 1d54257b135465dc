// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

/// Canonical article shape shared by every provider and every read path.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,     // source prefix + native id, e.g. "hn_42"
    pub title: String,
    pub url: String,
    pub author: String,
    pub source: String, // e.g. "Hacker News", "DEV.to"
    pub score: i64,     // provider-native popularity, not normalized
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Build a collision-free article id from a provider prefix and the upstream id.
pub fn prefixed_id(prefix: &str, native_id: impl std::fmt::Display) -> String {
    format!("{prefix}_{native_id}")
}

/// One upstream content source.
///
/// Implementations must return at most `limit` articles, skip items that fail
/// individually, and fail the whole call only when the upstream listing itself
/// is unreachable or `cancel` fires.
#[async_trait::async_trait]
pub trait ArticleProvider: Send + Sync {
    async fn fetch_articles(&self, cancel: &CancellationToken, limit: usize)
        -> Result<Vec<Article>>;
    fn name(&self) -> &'static str;
}
