mod common;

use std::time::{Duration, Instant};

use common::*;
use serde_json::json;
use spotirs::{
    client::{ScopedClient, UnscopedClient},
    config::RetryPolicy,
    Error,
};
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

#[tokio::test]
async fn no_content_is_not_decoded() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 2).await;

    Mock::given(method("GET"))
        .and(path("/v1/me/player/devices"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = user_client(&server).await;
    let devices = client.devices().await.unwrap();

    assert!(devices.is_empty());
}

#[tokio::test]
async fn rate_limit_is_retried_after_delay() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json(TRACK_ID, "Disco Man")))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client(&server).await;

    let started = Instant::now();
    let track = client.track(TRACK_ID).await.unwrap();

    assert!(started.elapsed() >= Duration::from_secs(3));
    assert_eq!(track.name, "Disco Man");
}

#[tokio::test]
async fn accepted_is_retried_like_rate_limit() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(202))
        .up_to_n_times(2)
        .with_priority(1)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json(TRACK_ID, "Disco Man")))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client(&server).await;
    client.track(TRACK_ID).await.unwrap();
}

#[tokio::test]
async fn rate_limit_without_retry_is_an_error() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client_with(&server, config_for(&server).retry_policy(RetryPolicy::disabled())).await;

    assert!(matches!(
        client.track(TRACK_ID).await,
        Err(Error::RateLimit {
            status: 429,
            retry_after: 7
        })
    ));
}

#[tokio::test]
async fn retries_are_bounded() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .expect(3)
        .mount(&server)
        .await;

    let config = config_for(&server).retry_policy(RetryPolicy {
        max_retries: Some(2),
        ..RetryPolicy::default()
    });
    let client = app_client_with(&server, config).await;

    assert!(matches!(
        client.track(TRACK_ID).await,
        Err(Error::RateLimit { status: 429, .. })
    ));
}

#[tokio::test]
async fn malformed_error_body_gets_synthesized_message() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(403).set_body_string("<html>Forbidden</html>"))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client(&server).await;

    match client.track(TRACK_ID).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 403);
            assert!(message.contains("403"), "message was {:?}", message);
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn error_envelope_message_is_surfaced() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "error": { "status": 404, "message": "Non existing id" } })),
        )
        .mount(&server)
        .await;

    let client = app_client(&server).await;

    match client.track(TRACK_ID).await {
        Err(Error::Api { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Non existing id");
        }
        other => panic!("expected an API error, got {:?}", other),
    }
}

#[tokio::test]
async fn undecodable_success_body_is_a_decode_error() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a track\"}"))
        .mount(&server)
        .await;

    let client = app_client(&server).await;

    assert!(matches!(client.track(TRACK_ID).await, Err(Error::Decode(_))));
}

#[tokio::test]
async fn expired_token_is_refreshed_once() {
    init_logging();
    let server = MockServer::start().await;
    // build, then the refresh
    mount_token_endpoint(&server, 2).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .and(header("authorization", "Bearer access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(track_json(TRACK_ID, "Disco Man")))
        .expect(1)
        .mount(&server)
        .await;

    let client = app_client(&server).await;
    let track = client.track(TRACK_ID).await.unwrap();

    assert_eq!(track.id.as_deref(), Some(TRACK_ID));
}

#[tokio::test]
async fn token_expiring_again_after_refresh_fails() {
    init_logging();
    let server = MockServer::start().await;
    mount_token_endpoint(&server, 2).await;

    Mock::given(method("GET"))
        .and(path(format!("/v1/tracks/{}", TRACK_ID)))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({ "error": { "status": 401, "message": "The access token expired" } })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let client = app_client(&server).await;

    assert!(matches!(client.track(TRACK_ID).await, Err(Error::AccessTokenExpired)));
}

#[tokio::test]
async fn invalid_client_credentials() {
    init_logging();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_client",
            "error_description": "Invalid client"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = spotirs::client::SpotifyClientBuilder::new("client-id")
        .config(config_for(&server))
        .client_secret("wrong")
        .build()
        .await;

    assert!(matches!(result, Err(Error::InvalidClient)));
}
