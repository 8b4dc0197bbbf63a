//! Integration tests for the HTTP providers using wiremock HTTP mocks.

use chrono::Utc;
use sift_core::{Platform, TimeFilter};
use sift_intel::{Provider, ProviderError, RedditProvider, YoutubeProvider};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reddit(server: &MockServer) -> RedditProvider {
    RedditProvider::with_base_urls("id", "secret", "sift-test/0.1", 5, &server.uri(), &server.uri())
        .expect("client construction should not fail")
}

fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({ "access_token": token, "token_type": "bearer", "expires_in": 3600 })
}

fn listing_body() -> serde_json::Value {
    let recent = Utc::now().timestamp() - 3600;
    serde_json::json!({
        "kind": "Listing",
        "data": {
            "children": [
                {
                    "kind": "t3",
                    "data": {
                        "id": "abc",
                        "title": "Grinder keeps jamming",
                        "selftext": "Any fixes?",
                        "subreddit": "Coffee",
                        "score": 40,
                        "num_comments": 12,
                        "created_utc": recent,
                        "permalink": "/r/Coffee/comments/abc/grinder/"
                    }
                },
                {
                    "kind": "t3",
                    "data": {
                        "id": "old",
                        "title": "Ancient thread",
                        "subreddit": "Coffee",
                        "score": 5,
                        "num_comments": 1,
                        "created_utc": 1_000_000_000,
                        "permalink": "/r/Coffee/comments/old/ancient/"
                    }
                }
            ]
        }
    })
}

#[tokio::test]
async fn reddit_search_maps_listing_and_drops_out_of_window_posts() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "grinder"))
        .and(query_param("t", "week"))
        .and(query_param("limit", "100"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .mount(&server)
        .await;

    let provider = reddit(&server);
    let posts = provider
        .search("grinder", "en", TimeFilter::Week)
        .await
        .expect("search should succeed");

    assert_eq!(posts.len(), 1);
    let post = &posts[0];
    assert_eq!(post.id, "reddit_abc");
    assert_eq!(post.platform, Platform::Reddit);
    assert_eq!(post.source, "r/Coffee");
    assert_eq!(post.engagement, 52);
    assert_eq!(post.url, "https://reddit.com/r/Coffee/comments/abc/grinder/");
    assert!(post.content.starts_with("Grinder keeps jamming"));

    // Second search reuses the cached token; `expect(1)` is verified on drop.
    provider
        .search("grinder", "en", TimeFilter::Week)
        .await
        .expect("cached token search should succeed");
}

#[tokio::test]
async fn reddit_refreshes_token_once_after_401() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("stale")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("fresh")))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing_body()))
        .mount(&server)
        .await;

    let posts = reddit(&server)
        .search("grinder", "en", TimeFilter::Week)
        .await
        .expect("refreshed search should succeed");
    assert_eq!(posts.len(), 1);
}

#[tokio::test]
async fn reddit_token_rejection_is_an_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = reddit(&server)
        .search("grinder", "en", TimeFilter::Week)
        .await
        .expect_err("403 on token exchange should fail");
    assert!(matches!(err, ProviderError::Auth(_)));
}

#[tokio::test]
async fn reddit_server_error_is_unexpected_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok")))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = reddit(&server)
        .search("grinder", "en", TimeFilter::Week)
        .await
        .expect_err("503 should fail");
    assert!(matches!(err, ProviderError::UnexpectedStatus { status: 503, .. }));
}

fn youtube_feed() -> String {
    let published = (Utc::now() - chrono::Duration::days(2)).to_rfc3339();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns:yt="http://www.youtube.com/xml/schemas/2015" xmlns:media="http://search.yahoo.com/mrss/" xmlns="http://www.w3.org/2005/Atom">
  <title>YouTube</title>
  <entry>
    <yt:videoId>vid1</yt:videoId>
    <title>Cold brew in 5 minutes</title>
    <author><name>Brew Lab</name></author>
    <published>{published}</published>
    <media:group>
      <media:description>Quick method</media:description>
      <media:community><media:statistics views="9001"/></media:community>
    </media:group>
  </entry>
  <entry>
    <yt:videoId>vid0</yt:videoId>
    <title>Old video</title>
    <published>2015-01-01T00:00:00+00:00</published>
  </entry>
</feed>"#
    )
}

#[tokio::test]
async fn youtube_search_parses_feed_within_window() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .and(query_param("search_query", "cold brew"))
        .and(query_param("hl", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(youtube_feed()))
        .mount(&server)
        .await;

    let provider = YoutubeProvider::with_base_url("sift-test/0.1", 5, &server.uri())
        .expect("client construction should not fail");
    let posts = provider
        .search("cold brew", "en", TimeFilter::Month)
        .await
        .expect("feed should parse");

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].id, "youtube_vid1");
    assert_eq!(posts[0].source, "Brew Lab");
    assert_eq!(posts[0].engagement, 9001);
}

#[tokio::test]
async fn youtube_error_status_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/feeds/videos.xml"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let provider = YoutubeProvider::with_base_url("sift-test/0.1", 5, &server.uri())
        .expect("client construction should not fail");
    let err = provider
        .search("cold brew", "en", TimeFilter::Week)
        .await
        .expect_err("429 should fail");
    assert!(matches!(err, ProviderError::UnexpectedStatus { status: 429, .. }));
}
