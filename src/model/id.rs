//! Spotify IDs.
//!
//! An ID can be given in three forms:
//! - URIs: `spotify:track:2pDPOMX0kWA7kcPBcDCQBu`
//! - URLs: `https://open.spotify.com/track/2pDPOMX0kWA7kcPBcDCQBu`. The URL may contain any query parameters.
//! - Bare IDs: `2pDPOMX0kWA7kcPBcDCQBu`
//!
//! URIs and URLs carry their item type, so parsing them with [SpotifyId::parse] checks the type matches the expected
//! one. Bare IDs are only checked to *look* like valid IDs; there is no guarantee they exist in Spotify's catalog.
//!
//! ```
//! # use spotirs::model::{id::SpotifyId, ItemType};
//! let from_uri = SpotifyId::parse(ItemType::Track, "spotify:track:2pDPOMX0kWA7kcPBcDCQBu").unwrap();
//! let from_url =
//!     SpotifyId::parse(ItemType::Track, "https://open.spotify.com/track/2pDPOMX0kWA7kcPBcDCQBu?si=a").unwrap();
//!
//! assert_eq!(from_uri, from_url);
//! assert_eq!(from_uri.as_str(), "2pDPOMX0kWA7kcPBcDCQBu");
//!
//! // the URI is for a track, but an album ID is expected
//! assert!(SpotifyId::parse(ItemType::Album, "spotify:track:2pDPOMX0kWA7kcPBcDCQBu").is_err());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::ItemType;
use crate::error::IdError;

const ID_LENGTH: usize = 22; // catalog IDs are always this long
const URL_PREFIX: &str = "https://open.spotify.com/";
const URI_PREFIX: &str = "spotify:";

/// A validated Spotify ID of a known item type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpotifyId {
    item_type: ItemType,
    id: String,
}

impl SpotifyId {
    /// Parse an URI, URL or bare ID of the given item type.
    pub fn parse(item_type: ItemType, input: &str) -> Result<Self, IdError> {
        let input = input.trim();

        if input.starts_with(URI_PREFIX) {
            Self::from_uri(item_type, input)
        } else if input.starts_with(URL_PREFIX) {
            Self::from_url(item_type, input)
        } else {
            Self::from_bare(item_type, input)
        }
    }

    pub fn from_uri(item_type: ItemType, uri: &str) -> Result<Self, IdError> {
        let (parsed_type, id) = uri
            .strip_prefix(URI_PREFIX)
            .and_then(|prefix_removed| prefix_removed.split_once(':'))
            .ok_or_else(|| IdError::MalformedString(uri.to_owned()))?;

        Self::checked(item_type, parsed_type.parse()?, id)
    }

    pub fn from_url(item_type: ItemType, url: &str) -> Result<Self, IdError> {
        // a whole URL could look like: https://open.spotify.com/track/3mXLyNsVeLelMakgpGUp1f?si=AAAAAAAAAAAAAAAA
        let (parsed_type, id) = url
            .strip_prefix(URL_PREFIX)
            .and_then(|prefix_removed| prefix_removed.split_once('/'))
            .map(|(item_type, id_with_possible_query)| {
                let id = id_with_possible_query
                    .split_once('?')
                    .map_or(id_with_possible_query, |(left, _)| left);

                (item_type, id)
            })
            .ok_or_else(|| IdError::MalformedString(url.to_owned()))?;

        Self::checked(item_type, parsed_type.parse()?, id)
    }

    pub fn from_bare(item_type: ItemType, bare: &str) -> Result<Self, IdError> {
        if verify_valid_id(item_type, bare) {
            Ok(Self {
                item_type,
                id: bare.to_owned(),
            })
        } else {
            Err(IdError::InvalidId(bare.to_owned()))
        }
    }

    fn checked(expected: ItemType, actual: ItemType, id: &str) -> Result<Self, IdError> {
        if expected != actual {
            return Err(IdError::WrongItemType { expected, actual });
        }

        Self::from_bare(expected, id)
    }

    pub fn item_type(&self) -> ItemType {
        self.item_type
    }

    /// The bare ID.
    pub fn as_str(&self) -> &str {
        &self.id
    }

    pub fn uri(&self) -> String {
        format!("{URI_PREFIX}{}:{}", self.item_type, self.id)
    }

    pub fn url(&self) -> String {
        format!("{URL_PREFIX}{}/{}", self.item_type, self.id)
    }

    pub fn into_string(self) -> String {
        self.id
    }
}

impl fmt::Display for SpotifyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

impl Serialize for SpotifyId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.uri())
    }
}

impl<'de> Deserialize<'de> for SpotifyId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let uri = String::deserialize(deserializer)?;
        let item_type: ItemType = uri
            .strip_prefix(URI_PREFIX)
            .and_then(|rest| rest.split_once(':'))
            .ok_or_else(|| D::Error::custom(IdError::MalformedString(uri.clone())))?
            .0
            .parse()
            .map_err(D::Error::custom)?;

        Self::from_uri(item_type, &uri).map_err(D::Error::custom)
    }
}

fn verify_valid_id(item_type: ItemType, id: &str) -> bool {
    if item_type == ItemType::User {
        // user IDs are free-form usernames
        return !id.is_empty() && !id.contains(|c: char| c.is_whitespace() || c == '/' || c == ':');
    }

    // catalog IDs are base-62 strings and they look like 3mXLyNsVeLelMakgpGUp1f
    id.len() == ID_LENGTH && id.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_id_from_uri() {
        let id = SpotifyId::parse(ItemType::Track, "spotify:track:2pDPOMX0kWA7kcPBcDCQBu").unwrap();

        assert_eq!(id.as_str(), "2pDPOMX0kWA7kcPBcDCQBu");
        assert_eq!(id.item_type(), ItemType::Track);
    }

    #[test]
    fn album_id_from_url_with_query() {
        let id = SpotifyId::parse(
            ItemType::Album,
            "https://open.spotify.com/album/0tDsHtvN9YNuZjlqHvDY2P?si=AAAAAAAAAA",
        )
        .unwrap();

        assert_eq!(id.as_str(), "0tDsHtvN9YNuZjlqHvDY2P");
    }

    #[test]
    fn playlist_id_from_bare() {
        let id = SpotifyId::parse(ItemType::Playlist, "37i9dQZF1DWZipvLjDtZYe").unwrap();

        assert_eq!(id.uri(), "spotify:playlist:37i9dQZF1DWZipvLjDtZYe");
        assert_eq!(id.url(), "https://open.spotify.com/playlist/37i9dQZF1DWZipvLjDtZYe");
    }

    #[test]
    fn user_id_is_free_form() {
        let id = SpotifyId::parse(ItemType::User, "spotify:user:some.user_1").unwrap();
        assert_eq!(id.as_str(), "some.user_1");

        assert!(SpotifyId::parse(ItemType::User, "").is_err());
    }

    #[test]
    fn wrong_item_type() {
        let err = SpotifyId::parse(ItemType::Artist, "spotify:track:2pDPOMX0kWA7kcPBcDCQBu").unwrap_err();

        assert_eq!(
            err,
            IdError::WrongItemType {
                expected: ItemType::Artist,
                actual: ItemType::Track
            }
        );
    }

    #[test]
    fn invalid_ids() {
        assert_eq!(
            SpotifyId::parse(ItemType::Track, "too-short"),
            Err(IdError::InvalidId(String::from("too-short")))
        );
        assert!(matches!(
            SpotifyId::parse(ItemType::Track, "spotify:banana:2pDPOMX0kWA7kcPBcDCQBu"),
            Err(IdError::UnknownItemType(_))
        ));
        assert!(matches!(
            SpotifyId::parse(ItemType::Track, "spotify:track"),
            Err(IdError::MalformedString(_))
        ));
    }

    #[test]
    fn serde_uses_uri() {
        let id = SpotifyId::parse(ItemType::Artist, "6pNgnvzBa6Bthsv8SrZJYl").unwrap();
        let json = serde_json::to_string(&id).unwrap();

        assert_eq!(json, r#""spotify:artist:6pNgnvzBa6Bthsv8SrZJYl""#);
        assert_eq!(serde_json::from_str::<SpotifyId>(&json).unwrap(), id);
    }
}
