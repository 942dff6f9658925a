//! Everything related to albums.

use super::{artist::SimplifiedArtist, page::Page, track::Track, DatePrecision, ExternalIds, ExternalUrls, Image};
use serde::{Deserialize, Serialize};

/// An album as returned from the album endpoints and from search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub name: String,
    pub album_type: Option<AlbumType>,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
    pub release_date_precision: Option<DatePrecision>,
    pub total_tracks: Option<u32>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub label: Option<String>,
    pub popularity: Option<u32>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    /// The first page of the album's tracks. Only included in full album objects.
    #[serde(default, skip_serializing)]
    pub tracks: Option<Page<Track>>,
    pub uri: Option<String>,
}

/// The album object embedded in tracks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedAlbum {
    pub id: Option<String>,
    pub name: String,
    pub album_type: Option<AlbumType>,
    #[serde(default)]
    pub images: Vec<Image>,
    pub release_date: Option<String>,
}

/// An album in the current user's library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedAlbum {
    pub added_at: String,
    pub album: Album,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumType {
    #[serde(alias = "ALBUM")]
    Album,
    #[serde(alias = "SINGLE")]
    Single,
    #[serde(alias = "COMPILATION")]
    Compilation,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Albums {
    pub albums: Vec<Option<Album>>,
}
