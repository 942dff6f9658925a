//! Spotify clients and the endpoint traits they implement.
//!
//! Every client starts from a [SpotifyClientBuilder]. With only the application client ID, the builder yields a
//! [SpotifyClient] that can log users in with PKCE. With the client secret too, it yields a
//! [SpotifyClientWithSecret] that has an access token of its own through the client credentials flow and can call
//! all the [unscoped endpoints](UnscopedClient).
//!
//! ```no_run
//! # use spotirs::client::{SpotifyClientBuilder, UnscopedClient};
//! # async fn foo() -> spotirs::Result<()> {
//! let spotify_client = SpotifyClientBuilder::new("application client ID")
//!     .client_secret("application client secret")
//!     .build()
//!     .await?;
//!
//! let track = spotify_client.track_by_name("Disco Man Remi Wolf").await?;
//! println!("{} by {}", track.name, track.artist_names().collect::<Vec<_>>().join(", "));
//! # Ok(())
//! # }
//! ```

pub mod authorization_code;
pub mod pagination;
pub(crate) mod private;
pub(crate) mod request;
pub mod resolve;
pub mod scoped;
pub mod unscoped;

use std::{
    env,
    sync::{Arc, PoisonError, RwLock},
};

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client as AsyncClient, StatusCode};
use serde::Deserialize;

pub use self::{
    authorization_code::{
        AuthorizationCodeUserClient, AuthorizationCodeUserClientBuilder, IncompleteAuthorizationCodeUserClient,
    },
    pagination::{Collected, FetchLimit},
    resolve::Lookup,
    scoped::{DeviceTarget, ScopedClient},
    unscoped::{SearchBuilder, UnscopedClient},
};
use crate::{
    config::{ClientConfig, ACCOUNTS_API_TOKEN_PATH, CLIENT_ID_ENV, CLIENT_SECRET_ENV},
    error::{Error, Result},
    model::error::{AuthenticationErrorKind, AuthenticationErrorResponse},
};

pub(crate) const RANDOM_STATE_LENGTH: usize = 16;
pub(crate) const PKCE_VERIFIER_LENGTH: usize = 128; // maximum Spotify allows

/// Clients that have automatically refreshable access tokens implement this trait.
///
/// These are [SpotifyClientWithSecret] and [AuthorizationCodeUserClient]. The clients refresh their access tokens on
/// their own when a request reports the token has expired, so calling this yourself is rarely needed.
#[async_trait]
pub trait AccessTokenRefresh: crate::private::Sealed {
    /// Request a new access token from Spotify and save it internally in the client.
    async fn refresh_access_token(&self) -> Result<()>;
}

/// A client without an access token. It can only begin [PKCE logins](SpotifyClient::authorization_code_client_with_pkce)
/// or restore one from a refresh token.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    inner: Arc<SpotifyClientRef>,
    http_client: AsyncClient,
}

#[derive(Debug)]
struct SpotifyClientRef {
    client_id: String,
    config: ClientConfig,
}

/// A client that has the application client secret and an access token from the client credentials flow.
///
/// Implements all the [unscoped endpoints](UnscopedClient). The access token is shared between clones, so the client
/// does not need to be wrapped in an `Arc`.
#[derive(Debug, Clone)]
pub struct SpotifyClientWithSecret {
    inner: Arc<SpotifyClientWithSecretRef>,
    http_client: AsyncClient,
}

#[derive(Debug)]
struct SpotifyClientWithSecretRef {
    credentials: ClientCredentials,
    access_token: RwLock<String>,
    config: ClientConfig,
}

/// The application's credentials as they are sent to the accounts service.
#[derive(Debug, Clone)]
pub(crate) struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SpotifyClientBuilder {
    client_id: String,
    config: ClientConfig,
}

#[derive(Debug, Clone)]
pub struct ClientSecretSpotifyClientBuilder {
    client_id: String,
    client_secret: String,
    config: ClientConfig,
}

#[derive(Debug, Deserialize)]
struct ClientTokenResponse {
    access_token: String,

    // these fields are in the response but the library doesn't need them. keep them here for logging purposes
    #[allow(dead_code)]
    token_type: String,
    #[allow(dead_code)]
    expires_in: u32,
}

impl SpotifyClient {
    /// Begin a login with the authorization code flow using PKCE, since this client has no secret to authenticate
    /// itself with.
    pub fn authorization_code_client_with_pkce<S>(&self, redirect_uri: S) -> AuthorizationCodeUserClientBuilder
    where
        S: Into<String>,
    {
        AuthorizationCodeUserClientBuilder::new(
            redirect_uri.into(),
            ClientCredentials {
                client_id: self.inner.client_id.clone(),
                client_secret: None,
            },
            self.inner.config.clone(),
            self.http_client.clone(),
        )
        .with_pkce()
    }

    /// Restore a user client from a refresh token previously issued to a PKCE login.
    pub async fn authorization_code_client_with_refresh_token_and_pkce<S>(
        &self,
        refresh_token: S,
    ) -> Result<AuthorizationCodeUserClient>
    where
        S: Into<String>,
    {
        AuthorizationCodeUserClient::new_with_refresh_token(
            self.http_client.clone(),
            self.inner.config.clone(),
            ClientCredentials {
                client_id: self.inner.client_id.clone(),
                client_secret: None,
            },
            refresh_token.into(),
        )
        .await
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

impl SpotifyClientWithSecret {
    /// Begin a login with the authorization code flow.
    pub fn authorization_code_client<S>(&self, redirect_uri: S) -> AuthorizationCodeUserClientBuilder
    where
        S: Into<String>,
    {
        AuthorizationCodeUserClientBuilder::new(
            redirect_uri.into(),
            self.inner.credentials.clone(),
            self.inner.config.clone(),
            self.http_client.clone(),
        )
    }

    /// Restore a user client from a previously issued refresh token.
    pub async fn authorization_code_client_with_refresh_token<S>(
        &self,
        refresh_token: S,
    ) -> Result<AuthorizationCodeUserClient>
    where
        S: Into<String>,
    {
        AuthorizationCodeUserClient::new_with_refresh_token(
            self.http_client.clone(),
            self.inner.config.clone(),
            self.inner.credentials.clone(),
            refresh_token.into(),
        )
        .await
    }
}

impl SpotifyClientBuilder {
    pub fn new<S>(client_id: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            client_id: client_id.into(),
            config: ClientConfig::default(),
        }
    }

    /// Read the client ID and secret from the `SPOTIFY_ID` and `SPOTIFY_SECRET` environment variables.
    pub fn from_env() -> Result<ClientSecretSpotifyClientBuilder> {
        let client_id = env::var(CLIENT_ID_ENV).map_err(|_| Error::MissingCredentials(CLIENT_ID_ENV))?;
        let client_secret = env::var(CLIENT_SECRET_ENV).map_err(|_| Error::MissingCredentials(CLIENT_SECRET_ENV))?;

        Ok(Self::new(client_id).client_secret(client_secret))
    }

    /// Use the given configuration instead of the default one.
    pub fn config(self, config: ClientConfig) -> Self {
        Self { config, ..self }
    }

    pub fn client_secret<S>(self, client_secret: S) -> ClientSecretSpotifyClientBuilder
    where
        S: Into<String>,
    {
        ClientSecretSpotifyClientBuilder {
            client_id: self.client_id,
            client_secret: client_secret.into(),
            config: self.config,
        }
    }

    pub fn build(self) -> SpotifyClient {
        SpotifyClient {
            inner: Arc::new(SpotifyClientRef {
                client_id: self.client_id,
                config: self.config,
            }),
            http_client: AsyncClient::new(),
        }
    }
}

impl ClientSecretSpotifyClientBuilder {
    pub fn config(self, config: ClientConfig) -> Self {
        Self { config, ..self }
    }

    /// Request an access token with the client credentials flow and return the finished client.
    ///
    /// Fails with [InvalidClient](Error::InvalidClient) if Spotify doesn't accept the client ID and secret.
    pub async fn build(self) -> Result<SpotifyClientWithSecret> {
        let http_client = AsyncClient::new();
        let credentials = ClientCredentials {
            client_id: self.client_id,
            client_secret: Some(self.client_secret),
        };

        debug!("Requesting access token for client credentials flow");
        let token_response = request_client_credentials_token(&http_client, &self.config, &credentials).await?;

        Ok(SpotifyClientWithSecret {
            inner: Arc::new(SpotifyClientWithSecretRef {
                credentials,
                access_token: RwLock::new(token_response.access_token),
                config: self.config,
            }),
            http_client,
        })
    }
}

impl ClientCredentials {
    /// Attach the credentials to a token request: HTTP Basic authentication if there's a secret, otherwise the
    /// client ID in the form.
    pub(crate) fn authenticate<'a>(
        &'a self,
        request: reqwest::RequestBuilder,
        form: &mut Vec<(&'static str, &'a str)>,
    ) -> reqwest::RequestBuilder {
        match self.client_secret.as_deref() {
            Some(client_secret) => request.basic_auth(&self.client_id, Some(client_secret)),
            None => {
                form.push(("client_id", self.client_id.as_str()));
                request
            }
        }
    }
}

async fn request_client_credentials_token(
    http_client: &AsyncClient,
    config: &ClientConfig,
    credentials: &ClientCredentials,
) -> Result<ClientTokenResponse> {
    let mut form = vec![("grant_type", "client_credentials")];
    let request = http_client.post(config.accounts_url(ACCOUNTS_API_TOKEN_PATH)?);
    let request = credentials.authenticate(request, &mut form);

    let response = request.form(&form).send().await?;
    let response = extract_authentication_error(response).await.map_err(|err| match err {
        Error::UnhandledAuthenticationError(AuthenticationErrorKind::InvalidClient, _) => Error::InvalidClient,
        err => err,
    })?;

    let token_response: ClientTokenResponse = response.json().await?;
    debug!("Got token response for client credentials flow: {:?}", token_response);

    Ok(token_response)
}

impl crate::private::Sealed for SpotifyClientWithSecret {}

impl private::BuildHttpRequest for SpotifyClientWithSecret {
    fn http_client(&self) -> &AsyncClient {
        &self.http_client
    }

    fn access_token(&self) -> String {
        self.inner
            .access_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

#[async_trait]
impl AccessTokenRefresh for SpotifyClientWithSecret {
    async fn refresh_access_token(&self) -> Result<()> {
        debug!("Refreshing access token for client credentials flow");
        let token_response =
            request_client_credentials_token(&self.http_client, &self.inner.config, &self.inner.credentials).await?;

        *self.inner.access_token.write().unwrap_or_else(PoisonError::into_inner) = token_response.access_token;
        Ok(())
    }
}

#[async_trait]
impl private::AccessTokenExpiry for SpotifyClientWithSecret {
    async fn handle_access_token_expired(&self) -> Result<()> {
        self.refresh_access_token().await
    }
}

#[async_trait]
impl UnscopedClient for SpotifyClientWithSecret {}

/// Takes a response for an authentication request and if its status is 400 or 401, parses its body as an
/// authentication error. On success returns the given response without modifying it.
pub(crate) async fn extract_authentication_error(response: reqwest::Response) -> Result<reqwest::Response> {
    match response.status() {
        StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
            let error_response: AuthenticationErrorResponse = response.json().await?;
            error!("Authentication request failed: {:?}", error_response);

            Err(error_response.into_unhandled_error())
        }

        status if !status.is_success() => {
            let body = response.text().await?;
            let message = request::decode_error_message(status, &body);
            error!("Authentication request failed with {}: {}", status, message);

            Err(Error::Api {
                status: status.as_u16(),
                message: message.to_string(),
            })
        }

        _ => Ok(response),
    }
}
