use async_trait::async_trait;
use reqwest::{header, Method, RequestBuilder, Url};

use crate::{config::ClientConfig, error::Result};

/// Marker trait for signifying a Spotify client that includes user authentication;
/// [AuthorizationCodeUserClient](crate::client::AuthorizationCodeUserClient). This is used to separate the clients into
/// [scoped clients](crate::client::ScopedClient) and [unscoped clients](crate::client::UnscopedClient).
pub trait UserAuthenticatedClient: crate::private::Sealed {}

/// Every Spotify client implements this trait.
pub trait BuildHttpRequest: crate::private::Sealed {
    fn http_client(&self) -> &reqwest::Client;

    /// The current access token. Cloned out so no lock is held while the request is in flight.
    fn access_token(&self) -> String;

    fn config(&self) -> &ClientConfig;

    /// Returns a new [RequestBuilder](reqwest::RequestBuilder) with the bearer token and the configured language
    /// filled in. You probably shouldn't call this function directly; instead use
    /// [ApiRequest](crate::client::request::ApiRequest).
    fn build_http_request(&self, method: Method, url: Url) -> RequestBuilder {
        let request = self
            .http_client()
            .request(method, url)
            .bearer_auth(self.access_token());

        match self.config().get_accept_language() {
            Some(language) => request.header(header::ACCEPT_LANGUAGE, language),
            None => request,
        }
    }
}

/// Every Spotify client implements this trait.
#[async_trait]
pub trait AccessTokenExpiry: crate::private::Sealed {
    /// Replace the expired access token with a fresh one.
    async fn handle_access_token_expired(&self) -> Result<()>;
}
