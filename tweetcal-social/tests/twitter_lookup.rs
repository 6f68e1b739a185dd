mod common;

use serde_json::json;
use tweetcal_http::HttpError;
use tweetcal_social::twitter::{TweetError, TweetSource, TwitterApi};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn api_for(server: &MockServer) -> TwitterApi {
    TwitterApi::new("bearer-abc".to_string(), &server.uri()).expect("client")
}

#[tokio::test]
async fn returns_tweet_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/12345"))
        .and(header("authorization", "Bearer bearer-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"id": "12345", "text": "Rust meetup 4/1 19:00 @ Shibuya"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let text = api_for(&server).await.tweet_text("12345").await.unwrap();
    assert_eq!(text, "Rust meetup 4/1 19:00 @ Shibuya");
}

#[tokio::test]
async fn missing_tweet_yields_empty_text() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"value": "1", "title": "Not Found Error", "detail": "Could not find tweet with id: [1]."}]
        })))
        .mount(&server)
        .await;

    let text = api_for(&server).await.tweet_text("1").await.unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn unauthorized_is_an_error() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2/tweets/1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "title": "Unauthorized", "type": "about:blank", "status": 401, "detail": "Unauthorized"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = api_for(&server).await.tweet_text("1").await.unwrap_err();
    match err {
        TweetError::Http(HttpError::Api { status, message, .. }) => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(message, "Unauthorized");
        }
        other => panic!("expected http api error, got {other:?}"),
    }
}
