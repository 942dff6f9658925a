//! Client configuration: service base URLs, rate limit retry policy and response language.

use std::time::Duration;

use const_format::concatcp;
use reqwest::Url;

use crate::error::Result;

pub(crate) const API_BASE_URL: &str = "https://api.spotify.com/v1/";
pub(crate) const ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com/";

pub(crate) const ACCOUNTS_AUTHORIZE_PATH: &str = "authorize";
pub(crate) const ACCOUNTS_API_TOKEN_PATH: &str = "api/token";

/// The default redirect URI the [login listener](crate::login) serves.
pub const DEFAULT_REDIRECT_URI: &str = concatcp!("http://localhost:", DEFAULT_CALLBACK_PORT, DEFAULT_CALLBACK_PATH);
pub(crate) const DEFAULT_CALLBACK_PORT: u16 = 8080;
pub(crate) const DEFAULT_CALLBACK_PATH: &str = "/callback";

/// Environment variable for the application client ID.
pub const CLIENT_ID_ENV: &str = "SPOTIFY_ID";
/// Environment variable for the application client secret.
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_SECRET";

/// How the clients react to `429 Too Many Requests` and `202 Accepted` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Whether to wait and resend the request at all. If `false`, the responses are returned as
    /// [RateLimit-errors](crate::Error::RateLimit) right away.
    pub auto_retry: bool,
    /// How many times a single request may be resent. `None` retries for as long as the server asks to.
    pub max_retries: Option<u32>,
    /// How long to wait if the response has no parseable `Retry-After` header.
    pub default_retry_after: Duration,
}

/// Configuration shared by a client and every client derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_base_url: String,
    accounts_base_url: String,
    retry_policy: RetryPolicy,
    accept_language: Option<String>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            auto_retry: true,
            max_retries: Some(10),
            default_retry_after: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn disabled() -> Self {
        Self {
            auto_retry: false,
            ..Self::default()
        }
    }

    pub(crate) fn allows_retry(&self, retries_so_far: u32) -> bool {
        self.auto_retry && self.max_retries.map_or(true, |max| retries_so_far < max)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: API_BASE_URL.to_owned(),
            accounts_base_url: ACCOUNTS_BASE_URL.to_owned(),
            retry_policy: RetryPolicy::default(),
            accept_language: None,
        }
    }
}

impl ClientConfig {
    /// Override the Web API base URL. Defaults to `https://api.spotify.com/v1/`.
    pub fn api_base_url<S>(self, api_base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            api_base_url: with_trailing_slash(api_base_url.into()),
            ..self
        }
    }

    /// Override the accounts service base URL. Defaults to `https://accounts.spotify.com/`.
    pub fn accounts_base_url<S>(self, accounts_base_url: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            accounts_base_url: with_trailing_slash(accounts_base_url.into()),
            ..self
        }
    }

    pub fn retry_policy(self, retry_policy: RetryPolicy) -> Self {
        Self { retry_policy, ..self }
    }

    /// Send an `Accept-Language` header with every API request, e.g. `"fi"` or `"es-ES"`.
    pub fn accept_language<S>(self, accept_language: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            accept_language: Some(accept_language.into()),
            ..self
        }
    }

    pub fn get_retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }

    pub fn get_accept_language(&self) -> Option<&str> {
        self.accept_language.as_deref()
    }

    /// Resolve a path such as `me/tracks` against the Web API base URL.
    pub(crate) fn api_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&self.api_base_url)?.join(path)?)
    }

    pub(crate) fn accounts_url(&self, path: &str) -> Result<Url> {
        Ok(Url::parse(&self.accounts_base_url)?.join(path)?)
    }
}

fn with_trailing_slash(mut url: String) -> String {
    if !url.ends_with('/') {
        url.push('/');
    }

    url
}
