//! Everything related to artists.

use super::{page::CursorPage, ExternalUrls, Followers, Image};
use serde::{Deserialize, Serialize};

/// A full artist object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

/// The artist object embedded in tracks and albums.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedArtist {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Artists {
    pub artists: Vec<Option<Artist>>,
}

/// The body of `me/following?type=artist`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct FollowedArtists {
    pub artists: CursorPage<Artist>,
}
