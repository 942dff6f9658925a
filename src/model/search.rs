use serde::Deserialize;

use super::{album::Album, artist::Artist, page::Page, playlist::Playlist, track::Track, ItemType};

/// The default search types.
pub const DEFAULT_SEARCH_TYPES_STRING: &str = "album,artist,playlist,track";
/// The default search limit, i.e. how many items there are in each page.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;
/// The default search offset.
pub const DEFAULT_SEARCH_OFFSET: u32 = 0;

/// Trait for converting an object to a string used in Spotify's search types. This is implemented for all iterators of
/// [ItemType]-enums.
pub trait ToTypesString {
    fn to_types_string(self) -> String;
}

/// First pages of search results from a [search](crate::client::unscoped::UnscopedClient::search).
///
/// Only the item types that were searched for are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResults {
    tracks: Option<Page<Option<Track>>>,
    artists: Option<Page<Option<Artist>>>,
    albums: Option<Page<Option<Album>>>,
    // the API may return nulls in place of playlists it can't show
    playlists: Option<Page<Option<Playlist>>>,
}

impl SearchResults {
    /// Return the tracks in these search results.
    pub fn tracks(&self) -> impl Iterator<Item = &Track> {
        flatten(&self.tracks)
    }

    pub fn artists(&self) -> impl Iterator<Item = &Artist> {
        flatten(&self.artists)
    }

    pub fn albums(&self) -> impl Iterator<Item = &Album> {
        flatten(&self.albums)
    }

    pub fn playlists(&self) -> impl Iterator<Item = &Playlist> {
        flatten(&self.playlists)
    }

    /// Take the tracks out of these search results.
    pub fn into_tracks(self) -> Vec<Track> {
        into_flattened(self.tracks)
    }

    pub fn into_artists(self) -> Vec<Artist> {
        into_flattened(self.artists)
    }

    pub fn into_albums(self) -> Vec<Album> {
        into_flattened(self.albums)
    }

    pub fn into_playlists(self) -> Vec<Playlist> {
        into_flattened(self.playlists)
    }

    /// The total number of matches for the given item type, as reported by the server.
    pub fn total(&self, item_type: ItemType) -> u32 {
        match item_type {
            ItemType::Track => self.tracks.as_ref().map(|page| page.total),
            ItemType::Artist => self.artists.as_ref().map(|page| page.total),
            ItemType::Album => self.albums.as_ref().map(|page| page.total),
            ItemType::Playlist => self.playlists.as_ref().map(|page| page.total),
            _ => None,
        }
        .unwrap_or(0)
    }
}

fn flatten<T>(page: &Option<Page<Option<T>>>) -> impl Iterator<Item = &T> {
    page.iter().flat_map(|page| page.items.iter().flatten())
}

fn into_flattened<T>(page: Option<Page<Option<T>>>) -> Vec<T> {
    page.map(|page| page.items.into_iter().flatten().collect())
        .unwrap_or_default()
}

impl<I> ToTypesString for I
where
    I: IntoIterator<Item = ItemType>,
{
    fn to_types_string(self) -> String {
        self.into_iter()
            .map(|ty| ty.to_string())
            .collect::<Vec<String>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn types_string() {
        assert_eq!([ItemType::Track, ItemType::Album].to_types_string(), "track,album");
    }

    #[test]
    fn skips_null_playlists() {
        let results: SearchResults = serde_json::from_value(json!({
            "playlists": {
                "items": [null, { "id": "37i9dQZF1DWZipvLjDtZYe", "name": "Chill" }],
                "total": 2,
                "limit": 20,
                "offset": 0,
                "next": null,
                "previous": null
            }
        }))
        .unwrap();

        assert_eq!(results.playlists().count(), 1);
        assert_eq!(results.total(ItemType::Playlist), 2);
        assert_eq!(results.tracks().count(), 0);
        assert_eq!(results.total(ItemType::Track), 0);
    }
}
