use thiserror::Error;

use crate::model::{error::AuthenticationErrorKind, ItemType};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("The given state does not match the original state")]
    AuthorizationCodeStateMismatch,
    #[error("The user denied the authorization request: {0}")]
    AuthorizationDenied(String),
    #[error("The authorization code is invalid")]
    InvalidAuthorizationCode,
    #[error("The access token expired")]
    AccessTokenExpired,
    #[error("The refresh token is invalid: {0}. The user should be reauthorized")]
    InvalidRefreshToken(String),
    #[error("The client ID or secret is invalid")]
    InvalidClient,
    #[error("Missing client credentials: environment variable {0} is not set")]
    MissingCredentials(&'static str),

    #[error("The server asked to retry the request in {retry_after} seconds (HTTP {status})")]
    RateLimit { status: u16, retry_after: u64 },

    #[error("Spotify API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unhandled authentication error: {0:?}: {1}")]
    UnhandledAuthenticationError(AuthenticationErrorKind, String),

    #[error("Search for {kind} \"{query}\" returned no results")]
    NoSearchResults { kind: ItemType, query: String },
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("The login was abandoned before the callback completed")]
    LoginAborted,
    #[error("Timed out waiting for the login callback")]
    LoginTimeout,

    #[error("Failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors from parsing Spotify IDs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdError {
    #[error("The string is not a Spotify URI or URL: {0}")]
    MalformedString(String),
    #[error("Expected a {expected} ID, got a {actual} ID")]
    WrongItemType { expected: ItemType, actual: ItemType },
    #[error("Unknown item type: {0}")]
    UnknownItemType(String),
    #[error("Invalid ID: {0}")]
    InvalidId(String),
}

impl From<IdError> for Error {
    fn from(err: IdError) -> Self {
        Error::InvalidArgument(err.to_string())
    }
}
