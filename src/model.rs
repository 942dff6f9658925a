//! Objects returned from and sent to the Spotify Web API.

pub mod album;
pub mod artist;
pub mod audio;
pub mod error;
pub mod id;
pub mod page;
pub mod playback;
pub mod playlist;
pub mod search;
pub mod track;
pub mod user;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::IdError;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalIds {
    pub isrc: Option<String>,
    pub ean: Option<String>,
    pub upc: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Followers {
    pub href: Option<String>,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatePrecision {
    Year,
    Month,
    Day,
}

/// The kinds of objects in Spotify's catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    Album,
    Artist,
    Playlist,
    Track,
    Show,
    Episode,
    User,
}

impl ItemType {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Album => "album",
            ItemType::Artist => "artist",
            ItemType::Playlist => "playlist",
            ItemType::Track => "track",
            ItemType::Show => "show",
            ItemType::Episode => "episode",
            ItemType::User => "user",
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "album" => Ok(ItemType::Album),
            "artist" => Ok(ItemType::Artist),
            "playlist" => Ok(ItemType::Playlist),
            "track" => Ok(ItemType::Track),
            "show" => Ok(ItemType::Show),
            "episode" => Ok(ItemType::Episode),
            "user" => Ok(ItemType::User),
            other => Err(IdError::UnknownItemType(other.to_owned())),
        }
    }
}
