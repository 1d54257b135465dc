//! Substring search over title, author and tags.

use crate::ingest::types::Article;

/// Case-insensitive substring match on `title`, `author` or any tag.
/// Keeps the input order; a blank query matches everything.
pub fn search_articles(articles: &[Article], query: &str) -> Vec<Article> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return articles.to_vec();
    }
    articles
        .iter()
        .filter(|a| matches(a, &q))
        .cloned()
        .collect()
}

fn matches(a: &Article, q_lower: &str) -> bool {
    a.title.to_lowercase().contains(q_lower)
        || a.author.to_lowercase().contains(q_lower)
        || a.tags.iter().any(|t| t.to_lowercase().contains(q_lower))
}
