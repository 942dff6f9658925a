//! Contains the [AuthorizationCodeUserClient](AuthorizationCodeUserClient) and its builder structs. The client
//! implements the authorization code flow with optional PKCE.
//!
//! [Spotify documentation on the authorization code flow.](https://developer.spotify.com/documentation/general/guides/authorization/code-flow/).
//!
//! # Usage
//!
//! A new [AuthorizationCodeUserClient] may be built with the
//! [`authorization_code_client`-function](crate::client::SpotifyClientWithSecret::authorization_code_client) in
//! [SpotifyClientWithSecret](crate::client::SpotifyClientWithSecret).
//!
//! ```no_run
//! # use spotirs::client::SpotifyClientBuilder;
//! # use spotirs::scope::Scope;
//! # async fn foo() -> spotirs::Result<()> {
//! let spotify_client = SpotifyClientBuilder::from_env()?.build().await?;
//!
//! let incomplete_auth_code_client = spotify_client
//!     // the callback URL here should match one of the callback URLs
//!     // specified in your Spotify application
//!     .authorization_code_client("http://localhost:8080/callback")
//!     // without this, the default scopes are requested
//!     .scopes([Scope::UserLibraryRead])
//!     .show_dialog(true)
//!     .build();
//!
//! // direct the user to this URL. once they approve the application, they are
//! // redirected to the callback URL with a code and a state in the query
//! let authorize_url = incomplete_auth_code_client.get_authorize_url()?;
//!
//! let user_client = incomplete_auth_code_client.finalize("code", "state").await?;
//!
//! // the refresh token may be saved and used later to skip the login
//! let refresh_token = user_client.get_refresh_token();
//! # Ok(())
//! # }
//! ```
//!
//! The [login](crate::login) module can run the callback listener for you.
//!
//! # Usage with PKCE
//!
//! In case the application's client secret cannot be safely stored in the environment, PKCE may still be used to
//! strongly authenticate the client with Spotify. A new [AuthorizationCodeUserClient] that uses PKCE may be built with
//! the [`authorization_code_client_with_pkce`-function](crate::client::SpotifyClient::authorization_code_client_with_pkce)
//! in [SpotifyClient](crate::client::SpotifyClient). From there on the usage is identical.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use log::debug;
use rand::{distributions::Alphanumeric, Rng};
use serde::Deserialize;
use sha2::{Digest, Sha256};

use super::{
    extract_authentication_error, private, AccessTokenRefresh, ClientCredentials, ScopedClient, UnscopedClient,
    PKCE_VERIFIER_LENGTH, RANDOM_STATE_LENGTH,
};
use crate::{
    config::{ClientConfig, ACCOUNTS_API_TOKEN_PATH, ACCOUNTS_AUTHORIZE_PATH},
    error::{Error, Result},
    model::error::AuthenticationErrorKind,
    scope::{ToScopesString, DEFAULT_SCOPES},
};

/// A client that implements the authorization code flow to authenticate an user with Spotify. May optionally use PKCE
/// if the client secret is not available. See the [module-level documentation](self) for more information.
///
/// Implements all the [scoped](crate::client::ScopedClient) and [unscoped endpoints](crate::client::UnscopedClient).
///
/// This client uses `Arc` and interior mutability internally, so you do not need to wrap it in an `Arc` or a `Mutex` in
/// order to reuse it.
#[derive(Debug, Clone)]
pub struct AuthorizationCodeUserClient {
    inner: Arc<AuthorizationCodeUserClientRef>,
    http_client: reqwest::Client,
}

#[derive(Debug)]
struct AuthorizationCodeUserClientRef {
    access_token: RwLock<String>,
    refresh_token: RwLock<String>,
    credentials: ClientCredentials,
    config: ClientConfig,
}

/// An incomplete authorization code user client.
///
/// The client has been configured, and it has to be [finalized](IncompleteAuthorizationCodeUserClient::finalize) by
/// directing the user to the [authorize URL](IncompleteAuthorizationCodeUserClient::get_authorize_url) and retrieving
/// an authorization code and a state parameter from the redirect callback URL.
#[derive(Debug)]
pub struct IncompleteAuthorizationCodeUserClient {
    credentials: ClientCredentials,
    redirect_uri: String,
    state: String,
    scopes: String,
    show_dialog: bool,
    pkce_verifier: Option<String>,

    config: ClientConfig,
    http_client: reqwest::Client,
}

/// Builder for [AuthorizationCodeUserClient].
#[derive(Debug)]
pub struct AuthorizationCodeUserClientBuilder {
    credentials: ClientCredentials,
    redirect_uri: String,
    scopes: String,
    show_dialog: bool,
    pkce_verifier: Option<String>,

    config: ClientConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct AuthorizeUserTokenResponse {
    access_token: String,
    refresh_token: String,

    // these fields are in the response but the library doesn't need them. keep them here for logging purposes
    #[allow(dead_code)]
    scope: Option<String>,
    #[allow(dead_code)]
    expires_in: u32,
    #[allow(dead_code)]
    token_type: String,
}

#[derive(Debug, Deserialize)]
struct RefreshUserTokenResponse {
    access_token: String,
    refresh_token: Option<String>,

    #[allow(dead_code)]
    scope: Option<String>,
    #[allow(dead_code)]
    expires_in: u32,
    #[allow(dead_code)]
    token_type: String,
}

impl AuthorizationCodeUserClient {
    pub(crate) async fn new_with_refresh_token(
        http_client: reqwest::Client,
        config: ClientConfig,
        credentials: ClientCredentials,
        refresh_token: String,
    ) -> Result<Self> {
        debug!(
            "Attempting to create new authorization code flow client with existing refresh token (PKCE: {})",
            credentials.client_secret.is_none()
        );

        let token_response = request_refreshed_tokens(&http_client, &config, &credentials, &refresh_token).await?;
        let refresh_token = token_response.refresh_token.unwrap_or(refresh_token);

        Ok(Self {
            inner: Arc::new(AuthorizationCodeUserClientRef {
                access_token: RwLock::new(token_response.access_token),
                refresh_token: RwLock::new(refresh_token),
                credentials,
                config,
            }),
            http_client,
        })
    }

    /// Returns the current refresh token.
    ///
    /// The refresh token may be saved and reused later when creating a new client with the
    /// [`authorization_code_client_with_refresh_token`-function](crate::client::SpotifyClientWithSecret::authorization_code_client_with_refresh_token)
    /// or the [`authorization_code_client_with_refresh_token_and_pkce`-function](crate::client::SpotifyClient::authorization_code_client_with_refresh_token_and_pkce).
    ///
    /// This function returns an owned String by cloning the internal refresh token.
    pub fn get_refresh_token(&self) -> String {
        self.inner
            .refresh_token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_access_and_refresh_tokens(&self, token_response: RefreshUserTokenResponse) {
        *self.inner.access_token.write().unwrap_or_else(PoisonError::into_inner) = token_response.access_token;

        // Spotify may or may not rotate the refresh token
        if let Some(refresh_token) = token_response.refresh_token {
            *self.inner.refresh_token.write().unwrap_or_else(PoisonError::into_inner) = refresh_token;
        }
    }
}

impl IncompleteAuthorizationCodeUserClient {
    /// Returns an authorization URL the user should be directed to in some manner.
    ///
    /// Once the user approves the application, they are redirected back to the application's callback URL. The URL
    /// query in the callback will contain a `code` parameter and a `state` parameter, which should be passed to the
    /// [`finalize`-function](IncompleteAuthorizationCodeUserClient::finalize) in order to complete the client and get
    /// an [AuthorizationCodeUserClient].
    pub fn get_authorize_url(&self) -> Result<String> {
        let mut authorize_url = self.config.accounts_url(ACCOUNTS_AUTHORIZE_PATH)?;

        {
            let mut query = authorize_url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.redirect_uri)
                .append_pair("client_id", &self.credentials.client_id)
                .append_pair("state", &self.state)
                .append_pair("show_dialog", if self.show_dialog { "true" } else { "false" });

            if !self.scopes.is_empty() {
                query.append_pair("scope", &self.scopes);
            }

            if let Some(pkce_verifier) = self.pkce_verifier.as_deref() {
                let pkce_challenge = pkce_challenge(pkce_verifier);
                debug!("Using PKCE extension with challenge: {}", pkce_challenge);

                query
                    .append_pair("code_challenge_method", "S256")
                    .append_pair("code_challenge", &pkce_challenge);
            }
        }

        Ok(authorize_url.into())
    }

    /// The random state this login was started with. The callback must carry the same state back.
    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Finalize this client with a code and a state from the callback URL query the user was redirected to after they
    /// approved the application and return an usable [AuthorizationCodeUserClient].
    ///
    /// This function will use the authorization code to request an access and a refresh token from Spotify. If the
    /// originally generated state does not match the `state` parameter, the function will return an
    /// [AuthorizationCodeStateMismatch-error](Error::AuthorizationCodeStateMismatch).
    pub async fn finalize(self, code: &str, state: &str) -> Result<AuthorizationCodeUserClient> {
        if state != self.state {
            return Err(Error::AuthorizationCodeStateMismatch);
        }

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        if let Some(pkce_verifier) = self.pkce_verifier.as_deref() {
            debug!("Requesting access and refresh tokens for authorization code flow with PKCE");
            form.push(("code_verifier", pkce_verifier));
        } else {
            debug!("Requesting access and refresh tokens for authorization code flow");
        }

        let request = self.http_client.post(self.config.accounts_url(ACCOUNTS_API_TOKEN_PATH)?);
        let request = self.credentials.authenticate(request, &mut form);
        let response = request.form(&form).send().await?;

        let response = extract_authentication_error(response)
            .await
            .map_err(map_authentication_error)?;

        let token_response: AuthorizeUserTokenResponse = response.json().await?;
        debug!("Got token response for authorization code flow: {:?}", token_response);

        Ok(AuthorizationCodeUserClient {
            inner: Arc::new(AuthorizationCodeUserClientRef {
                access_token: RwLock::new(token_response.access_token),
                refresh_token: RwLock::new(token_response.refresh_token),
                credentials: self.credentials,
                config: self.config,
            }),
            http_client: self.http_client,
        })
    }
}

impl AuthorizationCodeUserClientBuilder {
    pub(super) fn new(
        redirect_uri: String,
        credentials: ClientCredentials,
        config: ClientConfig,
        http_client: reqwest::Client,
    ) -> Self {
        Self {
            credentials,
            redirect_uri,
            scopes: DEFAULT_SCOPES.to_scopes_string(),
            show_dialog: false,
            pkce_verifier: None,

            config,
            http_client,
        }
    }

    /// Generates a PKCE code verifier to be used in the authentication process.
    pub(super) fn with_pkce(self) -> Self {
        Self {
            pkce_verifier: Some(random_string(PKCE_VERIFIER_LENGTH)),
            ..self
        }
    }

    /// Specify the [OAuth authorization scopes](crate::scope::Scope) that the user is asked to grant for the
    /// application. Replaces the [default scopes](crate::scope::DEFAULT_SCOPES).
    pub fn scopes<T>(self, scopes: T) -> Self
    where
        T: ToScopesString,
    {
        Self {
            scopes: scopes.to_scopes_string(),
            ..self
        }
    }

    /// Set whether or not to force the user to approve the application again, if they've already done so.
    ///
    /// If false (default), a user who has already approved the application is automatically redirected to the specified
    /// redirect URL. If true, the user will not be automatically redirected and will have to approve the application
    /// again.
    pub fn show_dialog(self, show_dialog: bool) -> Self {
        Self { show_dialog, ..self }
    }

    /// Finalize the builder and return an [IncompleteAuthorizationCodeUserClient].
    pub fn build(self) -> IncompleteAuthorizationCodeUserClient {
        IncompleteAuthorizationCodeUserClient {
            credentials: self.credentials,
            redirect_uri: self.redirect_uri,
            state: random_string(RANDOM_STATE_LENGTH),
            scopes: self.scopes,
            show_dialog: self.show_dialog,
            pkce_verifier: self.pkce_verifier,

            config: self.config,
            http_client: self.http_client,
        }
    }
}

impl crate::private::Sealed for AuthorizationCodeUserClient {}

impl private::BuildHttpRequest for AuthorizationCodeUserClient {
    fn http_client(&self) -> &reqwest::Client {
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

impl private::UserAuthenticatedClient for AuthorizationCodeUserClient {}

#[async_trait]
impl UnscopedClient for AuthorizationCodeUserClient {}

#[async_trait]
impl ScopedClient for AuthorizationCodeUserClient {}

#[async_trait]
impl AccessTokenRefresh for AuthorizationCodeUserClient {
    async fn refresh_access_token(&self) -> Result<()> {
        // clone the token out so the lock guard isn't held across the await
        let refresh_token = self.get_refresh_token();
        debug!("Attempting to refresh authorization code flow access token");

        let token_response =
            request_refreshed_tokens(&self.http_client, &self.inner.config, &self.inner.credentials, &refresh_token)
                .await?;

        self.update_access_and_refresh_tokens(token_response);
        Ok(())
    }
}

#[async_trait]
impl private::AccessTokenExpiry for AuthorizationCodeUserClient {
    async fn handle_access_token_expired(&self) -> Result<()> {
        self.refresh_access_token().await
    }
}

async fn request_refreshed_tokens(
    http_client: &reqwest::Client,
    config: &ClientConfig,
    credentials: &ClientCredentials,
    refresh_token: &str,
) -> Result<RefreshUserTokenResponse> {
    let mut form = vec![("grant_type", "refresh_token"), ("refresh_token", refresh_token)];

    let request = http_client.post(config.accounts_url(ACCOUNTS_API_TOKEN_PATH)?);
    let request = credentials.authenticate(request, &mut form);
    let response = request.form(&form).send().await?;

    let response = extract_authentication_error(response)
        .await
        .map_err(map_refresh_token_error)?;

    let token_response: RefreshUserTokenResponse = response.json().await?;
    debug!(
        "Got token response for refreshing authorization code flow tokens: {:?}",
        token_response
    );

    Ok(token_response)
}

fn random_string(length: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

fn pkce_challenge(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier);
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

fn map_authentication_error(err: Error) -> Error {
    if let Error::UnhandledAuthenticationError(AuthenticationErrorKind::InvalidGrant, _) = err {
        Error::InvalidAuthorizationCode
    } else {
        err
    }
}

fn map_refresh_token_error(err: Error) -> Error {
    if let Error::UnhandledAuthenticationError(AuthenticationErrorKind::InvalidGrant, description) = err {
        Error::InvalidRefreshToken(description)
    } else {
        err
    }
}
