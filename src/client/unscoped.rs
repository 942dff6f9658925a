mod search_builder;

pub use search_builder::SearchBuilder;

use async_trait::async_trait;
use log::debug;
use serde::de::DeserializeOwned;

use super::{
    pagination::Collected,
    private,
    request::ApiRequest,
    resolve::{self, Searchable},
};
use crate::{
    error::Result,
    model::{album::Album, artist::Artist, id::SpotifyId, playlist::Playlist, track::Track, ItemType},
};

/// All unscoped Spotify endpoints. The functions in this trait do not require user authentication to use. All Spotify
/// clients with an access token implement this trait.
///
/// Functions that take an `id` accept a bare ID, an URI or an URL of the right item type. Functions that take multiple
/// IDs or names send one request per item and collect the results; an item that cannot be found does not stop the
/// others from being fetched.
#[async_trait]
pub trait UnscopedClient: private::BuildHttpRequest + private::AccessTokenExpiry + Sync + Sized {
    /// Get Spotify catalog information for a single track.
    async fn track(&self, id: &str) -> Result<Track> {
        catalog_item(self, ItemType::Track, id).await
    }

    async fn album(&self, id: &str) -> Result<Album> {
        catalog_item(self, ItemType::Album, id).await
    }

    async fn artist(&self, id: &str) -> Result<Artist> {
        catalog_item(self, ItemType::Artist, id).await
    }

    async fn playlist(&self, id: &str) -> Result<Playlist> {
        catalog_item(self, ItemType::Playlist, id).await
    }

    async fn tracks(&self, ids: &[&str]) -> Collected<Track> {
        catalog_items(self, ItemType::Track, ids).await
    }

    async fn albums(&self, ids: &[&str]) -> Collected<Album> {
        catalog_items(self, ItemType::Album, ids).await
    }

    async fn artists(&self, ids: &[&str]) -> Collected<Artist> {
        catalog_items(self, ItemType::Artist, ids).await
    }

    async fn playlists(&self, ids: &[&str]) -> Collected<Playlist> {
        catalog_items(self, ItemType::Playlist, ids).await
    }

    /// Get Spotify catalog information about albums, artists, playlists or tracks that match a keyword string.
    ///
    /// This function returns a [SearchBuilder](self::SearchBuilder) that you can use to configure the various search
    /// parameters and finally send the search query and get the results back.
    fn search<S>(&self, query: S) -> SearchBuilder<'_, Self, S>
    where
        S: AsRef<str>,
    {
        SearchBuilder::new(self, query)
    }

    /// Search for a track and return the first result.
    ///
    /// Misspelled or incomplete queries will still return a result, but the more information the query includes, the
    /// more likely the result is the intended one: `"Disco Man Remi Wolf"` rather than `"disco"`.
    async fn track_by_name(&self, query: &str) -> Result<Track> {
        resolve::first_search_result(self, query).await
    }

    async fn album_by_name(&self, query: &str) -> Result<Album> {
        resolve::first_search_result(self, query).await
    }

    async fn artist_by_name(&self, query: &str) -> Result<Artist> {
        resolve::first_search_result(self, query).await
    }

    async fn playlist_by_name(&self, query: &str) -> Result<Playlist> {
        resolve::first_search_result(self, query).await
    }

    async fn tracks_by_names(&self, queries: &[&str]) -> Collected<Track> {
        by_names(self, queries).await
    }

    async fn albums_by_names(&self, queries: &[&str]) -> Collected<Album> {
        by_names(self, queries).await
    }

    async fn artists_by_names(&self, queries: &[&str]) -> Collected<Artist> {
        by_names(self, queries).await
    }

    async fn playlists_by_names(&self, queries: &[&str]) -> Collected<Playlist> {
        by_names(self, queries).await
    }
}

async fn catalog_item<C, T>(client: &C, item_type: ItemType, id: &str) -> Result<T>
where
    C: UnscopedClient,
    T: DeserializeOwned,
{
    let id = SpotifyId::parse(item_type, id)?;
    let url = client.config().api_url(&format!("{}s/{}", item_type, id))?;

    debug!("Getting {} {}", item_type, id);
    ApiRequest::get(client, url).send_expecting().await
}

async fn catalog_items<C, T>(client: &C, item_type: ItemType, ids: &[&str]) -> Collected<T>
where
    C: UnscopedClient,
    T: DeserializeOwned + Send,
{
    let mut collected = Collected::default();

    for id in ids {
        collected.record(catalog_item(client, item_type, id).await);
    }

    collected
}

async fn by_names<C, T>(client: &C, queries: &[&str]) -> Collected<T>
where
    C: UnscopedClient,
    T: Searchable,
{
    let mut collected = Collected::default();

    for query in queries {
        collected.record(resolve::first_search_result(client, query).await);
    }

    collected
}
