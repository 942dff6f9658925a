//! Everything related to tracks.

use super::{album::SimplifiedAlbum, artist::SimplifiedArtist, ExternalIds, ExternalUrls};
use crate::util::duration_millis;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A track in Spotify's catalog, or a local track in a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// The track's ID. Local tracks don't have one.
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimplifiedArtist>,
    pub album: Option<SimplifiedAlbum>,
    #[serde(default)]
    pub track_number: u32,
    #[serde(default)]
    pub disc_number: u32,
    #[serde(rename = "duration_ms", with = "duration_millis")]
    pub duration: Duration,
    #[serde(default)]
    pub explicit: bool,
    pub popularity: Option<u32>,
    pub preview_url: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    pub is_playable: Option<bool>,
    #[serde(default)]
    pub available_markets: Vec<String>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub uri: Option<String>,
}

/// A track in the current user's library.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SavedTrack {
    pub added_at: String,
    pub track: Track,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub(crate) struct Tracks {
    pub tracks: Vec<Option<Track>>,
}

impl Track {
    pub fn artist_names(&self) -> impl Iterator<Item = &str> {
        self.artists.iter().map(|artist| artist.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_catalog_track() {
        let track: Track = serde_json::from_value(json!({
            "id": "2pDPOMX0kWA7kcPBcDCQBu",
            "name": "Disco Man",
            "artists": [{ "id": "1QAJqy2dA3ihHBFIHRphZj", "name": "Remi Wolf" }],
            "album": { "id": "0tDsHtvN9YNuZjlqHvDY2P", "name": "Juno" },
            "track_number": 3,
            "disc_number": 1,
            "duration_ms": 201000,
            "explicit": true,
            "popularity": 55,
            "preview_url": null,
            "is_local": false,
            "uri": "spotify:track:2pDPOMX0kWA7kcPBcDCQBu"
        }))
        .unwrap();

        assert_eq!(track.id.as_deref(), Some("2pDPOMX0kWA7kcPBcDCQBu"));
        assert_eq!(track.duration, Duration::from_secs(201));
        assert_eq!(track.artist_names().collect::<Vec<_>>(), ["Remi Wolf"]);
        assert_eq!(track.album.map(|album| album.name), Some(String::from("Juno")));
    }

    #[test]
    fn deserializes_local_track() {
        let track: Track = serde_json::from_value(json!({
            "id": null,
            "name": "demo",
            "duration_ms": 1000,
            "is_local": true
        }))
        .unwrap();

        assert!(track.is_local);
        assert!(track.id.is_none());
    }
}
