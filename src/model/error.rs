use crate::error::Error;
use serde::{de::Visitor, Deserialize};

/// The error body returned from the accounts service on a failed token request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct AuthenticationErrorResponse {
    pub error: AuthenticationErrorKind,
    #[serde(default)]
    pub error_description: String,
}

/// The error envelope returned from the Web API: `{"error": {"status": ..., "message": ...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub error: ApiErrorResponse,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub status: u16,
    #[serde(default = "ApiErrorMessage::empty")]
    pub message: ApiErrorMessage,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationErrorKind {
    InvalidRequest,
    InvalidClient,
    InvalidGrant,
    UnauthorizedClient,
    UnsupportedGrantType,
    InvalidScope,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub(crate) enum ApiErrorMessage {
    PermissionsMissing,
    TokenExpired,

    Other(String),
}

impl AuthenticationErrorResponse {
    pub fn into_unhandled_error(self) -> Error {
        Error::UnhandledAuthenticationError(self.error, self.error_description)
    }
}

impl ApiErrorMessage {
    fn empty() -> Self {
        ApiErrorMessage::Other(String::new())
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ApiErrorMessage::Other(msg) if msg.trim().is_empty())
    }
}

impl std::fmt::Display for ApiErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiErrorMessage::PermissionsMissing => f.write_str("Permissions missing"),
            ApiErrorMessage::TokenExpired => f.write_str("The access token expired"),
            ApiErrorMessage::Other(msg) => f.write_str(msg),
        }
    }
}

impl<'de> Deserialize<'de> for ApiErrorMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct SpotifyErrorMessageVisitor;

        impl<'de> Visitor<'de> for SpotifyErrorMessageVisitor {
            type Value = ApiErrorMessage;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                self.visit_string(v.to_owned())
            }

            fn visit_string<E>(self, v: String) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                match v.as_str() {
                    "Permissions missing" => Ok(ApiErrorMessage::PermissionsMissing),
                    "The access token expired" | "Token expired" => Ok(ApiErrorMessage::TokenExpired),

                    _ => Ok(ApiErrorMessage::Other(v)),
                }
            }
        }

        deserializer.deserialize_str(SpotifyErrorMessageVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_envelope() {
        let envelope: ApiErrorEnvelope =
            serde_json::from_str(r#"{"error": {"status": 404, "message": "Non existing id"}}"#).unwrap();

        assert_eq!(envelope.error.status, 404);
        assert_eq!(envelope.error.message, ApiErrorMessage::Other(String::from("Non existing id")));
    }

    #[test]
    fn recognises_expired_token() {
        for body in [
            r#"{"error": {"status": 401, "message": "The access token expired"}}"#,
            r#"{"error": {"status": 401, "message": "Token expired"}}"#,
        ] {
            let envelope: ApiErrorEnvelope = serde_json::from_str(body).unwrap();
            assert_eq!(envelope.error.message, ApiErrorMessage::TokenExpired);
        }
    }

    #[test]
    fn missing_message_is_empty() {
        let envelope: ApiErrorEnvelope = serde_json::from_str(r#"{"error": {"status": 500}}"#).unwrap();
        assert!(envelope.error.message.is_empty());
    }

    #[test]
    fn decodes_authentication_error() {
        let response: AuthenticationErrorResponse =
            serde_json::from_str(r#"{"error": "invalid_grant", "error_description": "Invalid authorization code"}"#)
                .unwrap();

        assert_eq!(response.error, AuthenticationErrorKind::InvalidGrant);
        assert_eq!(response.error_description, "Invalid authorization code");
    }
}
