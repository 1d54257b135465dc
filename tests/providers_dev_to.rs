// tests/providers_dev_to.rs
//
// DEV.to provider against a local mock of the articles endpoint.

use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use smartfeed::ingest::http_client;
use smartfeed::ingest::providers::DevToProvider;
use smartfeed::ArticleProvider;

fn provider(server: &MockServer) -> DevToProvider {
    let client = http_client(Duration::from_secs(5)).unwrap();
    DevToProvider::new(client, format!("{}/", server.uri()))
}

#[tokio::test]
async fn maps_page_and_tolerates_bad_timestamps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .and(query_param("top", "1"))
        .and(query_param("per_page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 42,
                "title": "Learning Go",
                "url": "https://dev.to/ann/learning-go",
                "published_at": "2024-03-01T12:00:00Z",
                "user": { "name": "Ann" },
                "positive_reactions_count": 17,
                "tag_list": ["go", "beginners"],
                "reading_time_minutes": 4
            },
            {
                "id": 43,
                "title": "Broken date",
                "url": "https://dev.to/bob/broken",
                "published_at": "not a date",
                "user": { "name": "Bob" },
                "positive_reactions_count": 3,
                "tag_list": []
            },
            {
                "id": 44,
                "title": "Over the limit",
                "url": "https://dev.to/x",
                "published_at": "2024-03-02T00:00:00Z",
                "user": { "name": "X" },
                "positive_reactions_count": 1,
                "tag_list": []
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let out = provider(&server)
        .fetch_articles(&CancellationToken::new(), 2)
        .await
        .expect("dev.to fetch ok");

    assert_eq!(out.len(), 2, "never more than the limit");

    let a = &out[0];
    assert_eq!(a.id, "dev_42");
    assert_eq!(a.source, "DEV.to");
    assert_eq!(a.author, "Ann");
    assert_eq!(a.score, 17);
    assert_eq!(a.tags, vec!["go".to_string(), "beginners".to_string()]);
    assert_eq!(a.created_at.timestamp(), 1_709_294_400);

    let b = &out[1];
    assert_eq!(b.id, "dev_43");
    assert_eq!(b.created_at.timestamp(), 0, "unparsable date falls back to unix zero");
}

#[tokio::test]
async fn upstream_error_fails_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider(&server)
        .fetch_articles(&CancellationToken::new(), 5)
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("dev.to"), "got: {err:#}");
}

#[tokio::test]
async fn undecodable_body_fails_the_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    assert!(provider(&server)
        .fetch_articles(&CancellationToken::new(), 5)
        .await
        .is_err());
}

#[tokio::test]
async fn malformed_item_is_skipped_not_fatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "title": "Good one",
                "url": "https://dev.to/a/good",
                "published_at": "2024-03-01T12:00:00Z",
                "user": { "name": "Ann" },
                "positive_reactions_count": 5,
                "tag_list": ["rust"]
            },
            {
                "id": 2,
                "title": null,
                "url": "https://dev.to/b/bad",
                "published_at": null,
                "user": { "name": "Bob" },
                "positive_reactions_count": null,
                "tag_list": []
            },
            { "title": "no id at all" },
            {
                "id": 3,
                "title": "Also fine",
                "url": "https://dev.to/c/fine",
                "published_at": "2024-03-02T12:00:00Z",
                "user": { "name": "Cy" },
                "positive_reactions_count": 1,
                "tag_list": "go"
            }
        ])))
        .mount(&server)
        .await;

    let out = provider(&server)
        .fetch_articles(&CancellationToken::new(), 10)
        .await
        .expect("bad elements must not fail the page");

    let ids: Vec<&str> = out.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["dev_1", "dev_3"]);
}

#[tokio::test]
async fn limit_counts_only_usable_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/articles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": "not-a-number" },
            { "id": 7, "title": "Seven" },
            { "id": 8, "title": "Eight" }
        ])))
        .mount(&server)
        .await;

    let out = provider(&server)
        .fetch_articles(&CancellationToken::new(), 1)
        .await
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "dev_7");
    assert_eq!(out[0].created_at.timestamp(), 0);
}
