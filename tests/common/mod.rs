// tests/common/mod.rs
//
// Stub providers shared by the integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::DateTime;
use tokio_util::sync::CancellationToken;

use smartfeed::{Article, ArticleProvider};

pub fn article(id: &str, title: &str, ts: i64) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://example.test/{id}"),
        author: "someone".to_string(),
        source: "Stub".to_string(),
        score: 0,
        created_at: DateTime::from_timestamp(ts, 0).unwrap(),
        tags: Vec::new(),
    }
}

pub fn with_tags(mut a: Article, tags: &[&str]) -> Article {
    a.tags = tags.iter().map(|t| t.to_string()).collect();
    a
}

pub fn with_score(mut a: Article, score: i64) -> Article {
    a.score = score;
    a
}

/// Returns a fixed list, or fails when `failing` is set.
pub struct StubProvider {
    pub name: &'static str,
    pub articles: Vec<Article>,
    pub failing: AtomicBool,
    pub calls: AtomicUsize,
    pub last_limit: AtomicUsize,
}

impl StubProvider {
    pub fn ok(name: &'static str, articles: Vec<Article>) -> Arc<Self> {
        Arc::new(Self {
            name,
            articles,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            last_limit: AtomicUsize::new(0),
        })
    }

    pub fn failing(name: &'static str) -> Arc<Self> {
        let p = Self::ok(name, Vec::new());
        p.failing.store(true, Ordering::SeqCst);
        p
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleProvider for StubProvider {
    async fn fetch_articles(
        &self,
        _cancel: &CancellationToken,
        limit: usize,
    ) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_limit.store(limit, Ordering::SeqCst);
        // yield so concurrent callers actually overlap
        tokio::task::yield_now().await;
        if self.failing.load(Ordering::SeqCst) {
            bail!("{} listing unavailable", self.name);
        }
        Ok(self.articles.iter().take(limit).cloned().collect())
    }

    fn name(&self) -> &'static str {
        self.name
    }
}
