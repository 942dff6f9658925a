#![allow(dead_code)]

use std::time::Duration;

use serde_json::{json, Value};
use spotirs::{
    client::{AuthorizationCodeUserClient, SpotifyClientBuilder, SpotifyClientWithSecret},
    config::{ClientConfig, RetryPolicy},
};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TRACK_ID: &str = "2pDPOMX0kWA7kcPBcDCQBu";
pub const OTHER_TRACK_ID: &str = "3mXLyNsVeLelMakgpGUp1f";

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default()
        .api_base_url(format!("{}/v1", server.uri()))
        .accounts_base_url(server.uri())
        .retry_policy(RetryPolicy {
            default_retry_after: Duration::from_millis(10),
            ..RetryPolicy::default()
        })
}

pub fn token_response(access_token: &str) -> Value {
    json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "refresh_token": "refresh-token"
    })
}

/// Mount the token endpoint, expecting it to be called `times` times.
pub async fn mount_token_endpoint(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_response("access-token")))
        .expect(times)
        .mount(server)
        .await;
}

pub async fn app_client(server: &MockServer) -> SpotifyClientWithSecret {
    app_client_with(server, config_for(server)).await
}

pub async fn app_client_with(server: &MockServer, config: ClientConfig) -> SpotifyClientWithSecret {
    SpotifyClientBuilder::new("client-id")
        .config(config)
        .client_secret("client-secret")
        .build()
        .await
        .expect("failed to build client")
}

/// A user client restored from a refresh token; costs two token requests.
pub async fn user_client(server: &MockServer) -> AuthorizationCodeUserClient {
    app_client(server)
        .await
        .authorization_code_client_with_refresh_token("refresh-token")
        .await
        .expect("failed to build user client")
}

pub fn track_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "artists": [{ "id": "1f5GqyOPo0CkotzzRwviBu", "name": "Remi Wolf" }],
        "duration_ms": 207959,
        "explicit": false,
        "is_local": false,
        "uri": format!("spotify:track:{}", id)
    })
}

pub fn artist_json(index: usize) -> Value {
    json!({
        "id": format!("{:0>22}", index),
        "name": format!("Artist {}", index),
        "uri": format!("spotify:artist:{:0>22}", index)
    })
}

pub fn saved_tracks_page(offset: usize, count: usize, total: usize) -> Value {
    let items: Vec<Value> = (offset..offset + count)
        .map(|index| {
            json!({
                "added_at": "2022-11-20T12:00:00Z",
                "track": track_json(&format!("{:0>22}", index), &format!("Track {}", index))
            })
        })
        .collect();

    json!({
        "items": items,
        "total": total,
        "limit": count,
        "offset": offset,
        "next": null,
        "previous": null
    })
}

pub fn search_tracks_json(tracks: Vec<Value>) -> Value {
    let total = tracks.len();

    json!({
        "tracks": {
            "items": tracks,
            "total": total,
            "limit": 1,
            "offset": 0,
            "next": null,
            "previous": null
        }
    })
}
