//! Read-only HTTP surface over [`ArticleService`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::aggregator::ArticleService;
use crate::error::FeedError;
use crate::ingest::types::Article;

#[derive(Clone)]
pub struct AppState {
    pub articles: Arc<ArticleService>,
    pub default_interests: Arc<Vec<String>>,
}

impl AppState {
    pub fn new(articles: Arc<ArticleService>, default_interests: Vec<String>) -> Self {
        Self {
            articles,
            default_interests: Arc::new(default_interests),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/articles", get(all_articles))
        .route("/api/articles/latest", get(latest_articles))
        .route("/api/articles/recommended", get(recommended_articles))
        .route("/api/articles/search", get(search_articles))
        .route("/api/articles/{article_id}", get(article_by_id))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for FeedError {
    fn into_response(self) -> Response {
        let status = match &self {
            FeedError::NotFound(_) => StatusCode::NOT_FOUND,
            FeedError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            FeedError::Upstream { .. } | FeedError::Task(_) => StatusCode::BAD_GATEWAY,
        };
        if status != StatusCode::NOT_FOUND {
            tracing::warn!(target: "feed", error = %self, %status, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, FeedError>;

// Dropping the handler future on client disconnect already aborts the fan-out;
// the token only makes the contract explicit.
fn request_token() -> CancellationToken {
    CancellationToken::new()
}

async fn all_articles(State(state): State<AppState>) -> ApiResult<Vec<Article>> {
    let all = state.articles.get_all_articles(&request_token()).await?;
    Ok(Json((*all).clone()))
}

async fn latest_articles(State(state): State<AppState>) -> ApiResult<Vec<Article>> {
    Ok(Json(
        state.articles.get_latest_articles(&request_token()).await?,
    ))
}

async fn article_by_id(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> ApiResult<Article> {
    Ok(Json(
        state
            .articles
            .get_article_by_id(&request_token(), &article_id)
            .await?,
    ))
}

#[derive(Debug, Deserialize)]
struct RecommendedQuery {
    /// Comma-separated interest terms.
    #[serde(default)]
    interests: Option<String>,
}

fn parse_interests(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

async fn recommended_articles(
    State(state): State<AppState>,
    Query(q): Query<RecommendedQuery>,
) -> Response {
    let mut interests = parse_interests(q.interests.as_deref());
    if interests.is_empty() {
        interests = (*state.default_interests).clone();
    }
    if interests.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "interests are not set" })),
        )
            .into_response();
    }

    match state
        .articles
        .get_recommended_articles(&request_token(), &interests)
        .await
    {
        Ok(v) => Json(v).into_response(),
        Err(e) => e.into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SearchQuery {
    #[serde(default)]
    q: String,
}

async fn search_articles(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> ApiResult<Vec<Article>> {
    Ok(Json(
        state.articles.search_articles(&request_token(), &q.q).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interests_are_split_and_trimmed() {
        assert_eq!(
            parse_interests(Some(" go, ,Rust ")),
            vec!["go".to_string(), "Rust".to_string()]
        );
        assert!(parse_interests(None).is_empty());
    }
}
