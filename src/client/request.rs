//! The request executor every endpoint goes through.
//!
//! An [ApiRequest] sends one logical request and applies the status policy to the response:
//!
//! - `2xx`, or a status explicitly [accepted](ApiRequest::accept_status), is a success. `204 No Content` never yields a
//!   body, whatever the caller expected to decode.
//! - `429 Too Many Requests` and `202 Accepted` are retried after the `Retry-After` delay as long as the client's
//!   [RetryPolicy](crate::config::RetryPolicy) allows it.
//! - `401` with an expired access token refreshes the token once and resends the request.
//! - Anything else is decoded from Spotify's error envelope into an [Api-error](Error::Api).

use std::time::Duration;

use log::{debug, error, info, trace, warn};
use reqwest::{header, Method, Response, StatusCode, Url};
use serde::{de::DeserializeOwned, Serialize};

use super::private::{AccessTokenExpiry, BuildHttpRequest};
use crate::{
    error::{Error, Result},
    model::error::{ApiErrorEnvelope, ApiErrorMessage},
};

/// A request to the Web API on behalf of a client.
pub(crate) struct ApiRequest<'a, C, B = ()>
where
    C: ?Sized,
{
    client: &'a C,
    method: Method,
    url: Url,
    body: Option<&'a B>,
    extra_success: Vec<StatusCode>,
}

impl<'a, C> ApiRequest<'a, C, ()>
where
    C: ?Sized,
{
    pub fn new(client: &'a C, method: Method, url: Url) -> Self {
        Self {
            client,
            method,
            url,
            body: None,
            extra_success: Vec::new(),
        }
    }

    pub fn get(client: &'a C, url: Url) -> Self {
        Self::new(client, Method::GET, url)
    }

    /// Send the given body serialized as JSON.
    pub fn json<B>(self, body: &'a B) -> ApiRequest<'a, C, B>
    where
        B: Serialize,
    {
        ApiRequest {
            client: self.client,
            method: self.method,
            url: self.url,
            body: Some(body),
            extra_success: self.extra_success,
        }
    }
}

impl<'a, C, B> ApiRequest<'a, C, B>
where
    C: BuildHttpRequest + AccessTokenExpiry + Sync + ?Sized,
    B: Serialize + Sync,
{
    /// Treat the given status as a success in addition to the `2xx` range.
    pub fn accept_status(mut self, status: StatusCode) -> Self {
        self.extra_success.push(status);
        self
    }

    /// Send the request and decode a successful response body. Returns `None` for `204 No Content`.
    pub async fn send_json<T>(self) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        match self.execute().await? {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Send the request and decode a successful response body, treating `204 No Content` as an error since a body was
    /// required.
    pub async fn send_expecting<T>(self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let method = self.method.clone();
        let url = self.url.clone();

        self.send_json().await?.ok_or_else(|| {
            warn!("Expected a response body from {} {} but got 204 No Content", method, url);
            Error::Api {
                status: StatusCode::NO_CONTENT.as_u16(),
                message: String::from("expected a response body, got none"),
            }
        })
    }

    /// Send the request and discard any successful response body.
    pub async fn send(self) -> Result<()> {
        self.execute().await.map(|_| ())
    }

    async fn execute(&self) -> Result<Option<String>> {
        let retry_policy = *self.client.config().get_retry_policy();
        let mut retries = 0;
        let mut refreshed = false;

        loop {
            let response = self.build().send().await?;
            let status = response.status();
            debug!("{} {}: {}", self.method, self.url, status);

            if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::ACCEPTED {
                let retry_after = retry_after(&response, retry_policy.default_retry_after);

                if retry_policy.allows_retry(retries) {
                    retries += 1;
                    info!(
                        "Got {} from {}, retrying in {} seconds (retry {})",
                        status,
                        self.url,
                        retry_after.as_secs(),
                        retries
                    );

                    rate_limit_sleep(retry_after).await;
                    continue;
                }

                warn!("Got {} from {} and retrying is not allowed", status, self.url);
                return Err(Error::RateLimit {
                    status: status.as_u16(),
                    retry_after: retry_after.as_secs(),
                });
            }

            // the body is read exactly once per attempt, even when it's thrown away
            let body = response.text().await?;
            trace!("Response body: {}", body);

            if status == StatusCode::NO_CONTENT {
                return Ok(None);
            }

            if status.is_success() || self.extra_success.contains(&status) {
                return Ok(Some(body));
            }

            let message = decode_error_message(status, &body);

            if status == StatusCode::UNAUTHORIZED && message == ApiErrorMessage::TokenExpired {
                if refreshed {
                    error!("Access token expired again right after refreshing it");
                    return Err(Error::AccessTokenExpired);
                }

                warn!("Access token expired, attempting to refresh");
                self.client.handle_access_token_expired().await?;
                refreshed = true;
                continue;
            }

            error!("{} {} failed with {}: {}", self.method, self.url, status, message);
            return Err(Error::Api {
                status: status.as_u16(),
                message: message.to_string(),
            });
        }
    }

    fn build(&self) -> reqwest::RequestBuilder {
        let request = self.client.build_http_request(self.method.clone(), self.url.clone());

        match self.body {
            Some(body) => request.json(body),
            None if self.method == Method::POST || self.method == Method::PUT => {
                request.header(header::CONTENT_LENGTH, 0)
            }
            None => request,
        }
    }
}

/// Decode Spotify's error envelope from a failed response's body. If the body is empty, malformed or has no message,
/// the message is made up from the status code instead.
pub(crate) fn decode_error_message(status: StatusCode, body: &str) -> ApiErrorMessage {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,

        _ => {
            warn!("Response to failed request has no usable error body: {:?}", body);
            ApiErrorMessage::Other(
                format!(
                    "unexpected HTTP {} {}",
                    status.as_u16(),
                    status.canonical_reason().unwrap_or_default()
                )
                .trim_end()
                .to_owned(),
            )
        }
    }
}

fn retry_after(response: &Response, default: Duration) -> Duration {
    response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|header| header.to_str().ok())
        .and_then(|header_str| header_str.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or_else(|| {
            warn!(
                "Response has no valid Retry-After header, waiting the default {} seconds",
                default.as_secs()
            );
            default
        })
}

async fn rate_limit_sleep(sleep_time: Duration) {
    tokio::time::sleep(sleep_time).await;
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    use super::*;
    use crate::config::ClientConfig;

    struct StaticTokenClient {
        http_client: reqwest::Client,
        config: ClientConfig,
    }

    impl crate::private::Sealed for StaticTokenClient {}

    impl BuildHttpRequest for StaticTokenClient {
        fn http_client(&self) -> &reqwest::Client {
            &self.http_client
        }

        fn access_token(&self) -> String {
            String::from("static-token")
        }

        fn config(&self) -> &ClientConfig {
            &self.config
        }
    }

    #[async_trait]
    impl AccessTokenExpiry for StaticTokenClient {
        async fn handle_access_token_expired(&self) -> Result<()> {
            Err(Error::AccessTokenExpired)
        }
    }

    fn client_for(server: &MockServer) -> StaticTokenClient {
        StaticTokenClient {
            http_client: reqwest::Client::new(),
            config: ClientConfig::default()
                .api_base_url(server.uri())
                .accept_language("fi"),
        }
    }

    #[tokio::test]
    async fn accepted_status_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/conflicted"))
            .respond_with(ResponseTemplate::new(409).set_body_string(r#"{"value": 1}"#))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.config().api_url("conflicted").unwrap();

        let value: serde_json::Value = ApiRequest::get(&client, url.clone())
            .accept_status(StatusCode::CONFLICT)
            .send_expecting()
            .await
            .unwrap();
        assert_eq!(value["value"], 1);

        let err = ApiRequest::get(&client, url).send().await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 409, .. }));
    }

    #[tokio::test]
    async fn headers_and_empty_put_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/me/tracks"))
            .and(header("authorization", "Bearer static-token"))
            .and(header("accept-language", "fi"))
            .and(header("content-length", "0"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.config().api_url("me/tracks").unwrap();

        ApiRequest::new(&client, Method::PUT, url).send().await.unwrap();
    }

    #[tokio::test]
    async fn expired_token_that_cannot_refresh_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/me"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"error": {"status": 401, "message": "The access token expired"}}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let url = client.config().api_url("me").unwrap();

        let err = ApiRequest::get(&client, url).send().await.unwrap_err();
        assert!(matches!(err, Error::AccessTokenExpired));
    }

    #[test]
    fn envelope_message_is_used() {
        let message = decode_error_message(
            StatusCode::NOT_FOUND,
            r#"{"error": {"status": 404, "message": "Non existing id"}}"#,
        );

        assert_eq!(message.to_string(), "Non existing id");
    }

    #[test]
    fn malformed_body_synthesizes_message() {
        let message = decode_error_message(StatusCode::FORBIDDEN, "<html>nope</html>");
        assert_eq!(message.to_string(), "unexpected HTTP 403 Forbidden");
    }

    #[test]
    fn empty_body_synthesizes_message() {
        let message = decode_error_message(StatusCode::BAD_GATEWAY, "");
        assert_eq!(message.to_string(), "unexpected HTTP 502 Bad Gateway");
    }

    #[test]
    fn empty_message_synthesizes_message() {
        let message = decode_error_message(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": {"status": 500, "message": ""}}"#,
        );

        assert_eq!(message.to_string(), "unexpected HTTP 500 Internal Server Error");
    }
}
