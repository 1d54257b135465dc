//! Interest-based ranking.
//!
//! score = provider score
//!       + 100 if any interest is a case-insensitive substring of the title
//!       + 50 for every (tag, interest) pair that matches case-insensitively
//!
//! Blank interests are dropped first; an empty term would be a substring of
//! every title.

use std::cmp::Ordering;

use crate::ingest::types::Article;

pub const TITLE_BOOST: f64 = 100.0;
pub const TAG_BOOST: f64 = 50.0;

/// Article paired with its derived score; lives for one ranking call.
#[derive(Debug, Clone)]
struct ScoredArticle<'a> {
    article: &'a Article,
    score: f64,
}

fn normalize_interests(interests: &[String]) -> Vec<String> {
    interests
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

fn score_one(article: &Article, interests_lower: &[String]) -> f64 {
    let mut score = article.score as f64;

    let title = article.title.to_lowercase();
    if interests_lower.iter().any(|i| title.contains(i.as_str())) {
        score += TITLE_BOOST;
    }

    for tag in &article.tags {
        let tag = tag.to_lowercase();
        let hits = interests_lower.iter().filter(|i| **i == tag).count();
        score += TAG_BOOST * hits as f64;
    }

    score
}

/// Derived recommendation score for a single article.
pub fn interest_score(article: &Article, interests: &[String]) -> f64 {
    score_one(article, &normalize_interests(interests))
}

/// Rank `articles` against `interests`, highest derived score first, and keep
/// the top `limit`. Ties keep input (recency) order. The input is never mutated.
pub fn recommend(articles: &[Article], interests: &[String], limit: usize) -> Vec<Article> {
    let interests = normalize_interests(interests);

    let mut scored: Vec<ScoredArticle<'_>> = articles
        .iter()
        .map(|article| ScoredArticle {
            article,
            score: score_one(article, &interests),
        })
        .collect();

    // stable
    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .map(|s| s.article.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn art(id: &str, title: &str, score: i64, tags: &[&str]) -> Article {
        Article {
            id: id.into(),
            title: title.into(),
            url: String::new(),
            author: String::new(),
            source: "test".into(),
            score,
            created_at: DateTime::from_timestamp(0, 0).unwrap(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn interests(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn title_and_tag_boosts_add_up() {
        let a = art("a", "Learning Go", 10, &["go"]);
        let b = art("b", "Cooking", 10, &[]);
        let i = interests(&["go"]);
        assert_eq!(interest_score(&a, &i), 160.0);
        assert_eq!(interest_score(&b, &i), 10.0);
        assert!(interest_score(&a, &i) - interest_score(&b, &i) >= 150.0);
    }

    #[test]
    fn title_boost_counts_once_tag_boost_per_pair() {
        let a = art("a", "Go and Rust", 0, &["Go", "rust", "GO"]);
        let i = interests(&["go", "rust"]);
        // title: +100 once; tags: Go(+50) rust(+50) GO(+50)
        assert_eq!(interest_score(&a, &i), 250.0);
    }

    #[test]
    fn blank_interests_are_ignored() {
        let a = art("a", "Anything", 3, &[]);
        assert_eq!(interest_score(&a, &interests(&["", "  "])), 3.0);
    }

    #[test]
    fn recommend_sorts_truncates_and_keeps_ties_stable() {
        let arts = vec![
            art("low", "misc", 1, &[]),
            art("tie1", "misc", 5, &[]),
            art("go", "Learning Go", 0, &["go"]),
            art("tie2", "misc", 5, &[]),
        ];
        let out = recommend(&arts, &interests(&["go"]), 3);
        let ids: Vec<_> = out.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["go", "tie1", "tie2"]);
        // input untouched
        assert_eq!(arts[0].id, "low");
    }
}
