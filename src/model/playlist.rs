//! Everything related to playlists.

use super::{page::Page, track::Track, user::PublicUser, ExternalUrls, Followers, Image};
use serde::{Deserialize, Serialize};

/// A playlist. The simplified form returned from search and `me/playlists` carries only a reference to its tracks
/// instead of the first page of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub owner: Option<PublicUser>,
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub followers: Followers,
    #[serde(default)]
    pub images: Vec<Image>,
    pub snapshot_id: Option<String>,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    #[serde(default, skip_serializing)]
    pub tracks: PlaylistTracksRef,
    pub uri: Option<String>,
}

/// Either the first page of a playlist's tracks or only their total count.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PlaylistTracksRef {
    Page(Page<PlaylistItem>),
    Reference { total: u32 },
}

/// An entry in a playlist.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaylistItem {
    pub added_at: Option<String>,
    #[serde(default)]
    pub is_local: bool,
    /// Missing when the track has been removed from Spotify's catalog.
    pub track: Option<Track>,
}

impl Default for PlaylistTracksRef {
    fn default() -> Self {
        Self::Reference { total: 0 }
    }
}

impl PlaylistTracksRef {
    pub fn total(&self) -> u32 {
        match self {
            PlaylistTracksRef::Page(page) => page.total,
            PlaylistTracksRef::Reference { total } => *total,
        }
    }
}

impl Playlist {
    pub fn follower_count(&self) -> u32 {
        self.followers.total
    }

    /// The tracks included in the playlist object itself. Use
    /// [playlist_tracks](crate::client::scoped::ScopedClient::playlist_tracks) to fetch all of them.
    pub fn embedded_tracks(&self) -> impl Iterator<Item = &Track> {
        let items = match &self.tracks {
            PlaylistTracksRef::Page(page) => page.items.as_slice(),
            PlaylistTracksRef::Reference { .. } => &[],
        };

        items.iter().filter_map(|item| item.track.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn simplified_playlist_has_track_reference() {
        let playlist: Playlist = serde_json::from_value(json!({
            "id": "37i9dQZF1DWZipvLjDtZYe",
            "name": "Chill",
            "tracks": { "href": "https://api.spotify.com/v1/playlists/37i9dQZF1DWZipvLjDtZYe/tracks", "total": 80 }
        }))
        .unwrap();

        assert_eq!(playlist.tracks.total(), 80);
        assert_eq!(playlist.embedded_tracks().count(), 0);
    }

    #[test]
    fn full_playlist_embeds_tracks() {
        let playlist: Playlist = serde_json::from_value(json!({
            "id": "37i9dQZF1DWZipvLjDtZYe",
            "name": "Chill",
            "followers": { "href": null, "total": 12 },
            "tracks": {
                "items": [
                    { "added_at": "2022-01-01T00:00:00Z", "track": { "id": "2pDPOMX0kWA7kcPBcDCQBu", "name": "a", "duration_ms": 1 } },
                    { "added_at": "2022-01-01T00:00:00Z", "track": null }
                ],
                "total": 2,
                "limit": 100,
                "offset": 0,
                "next": null
            }
        }))
        .unwrap();

        assert_eq!(playlist.follower_count(), 12);
        assert_eq!(playlist.tracks.total(), 2);
        assert_eq!(playlist.embedded_tracks().count(), 1);
    }
}
