use async_trait::async_trait;
use log::{debug, trace};
use reqwest::{Method, StatusCode};
use serde::de::{DeserializeOwned, IgnoredAny};

use super::{
    pagination::{collect_pages, fetch_page, Collected, FetchLimit, PageChunk, PageRequest, Position, MAX_PAGE_SIZE},
    private,
    request::ApiRequest,
    resolve::{join_ids, resolve_all, resolve_id, Lookup},
    unscoped::UnscopedClient,
};
use crate::{
    error::{Error, Result},
    model::{
        album::{Album, SavedAlbum},
        artist::{Artist, FollowedArtists},
        audio::{AudioAnalysis, AudioFeatures},
        id::SpotifyId,
        page::Page,
        playback::{Device, Devices, TransferPlaybackBody},
        playlist::{Playlist, PlaylistItem},
        track::{SavedTrack, Track},
        user::PrivateUser,
        ItemType,
    },
};

const API_SAVED_TRACKS_PATH: &str = "me/tracks";
const API_SAVED_ALBUMS_PATH: &str = "me/albums";
const API_SAVED_PLAYLISTS_PATH: &str = "me/playlists";
const API_FOLLOWING_PATH: &str = "me/following";
const API_FOLLOWED_ARTISTS_PATH: &str = "me/following?type=artist";
const API_PLAYER_PATH: &str = "me/player";
const API_PLAYER_DEVICES_PATH: &str = "me/player/devices";
const API_CURRENT_USER_PATH: &str = "me";

// the most IDs each batch endpoint takes in one request
const TRACK_BATCH_SIZE: usize = 50;
const ALBUM_BATCH_SIZE: usize = 20;
const FOLLOW_BATCH_SIZE: usize = 50;

/// The device to [transfer playback](ScopedClient::transfer_playback) to.
#[derive(Debug, Clone, Copy)]
pub enum DeviceTarget<'a> {
    Id(&'a str),
    Device(&'a Device),
}

impl<'a> From<&'a str> for DeviceTarget<'a> {
    fn from(id: &'a str) -> Self {
        Self::Id(id)
    }
}

impl<'a> From<&'a Device> for DeviceTarget<'a> {
    fn from(device: &'a Device) -> Self {
        Self::Device(device)
    }
}

/// All scoped Spotify endpoints. The functions in this trait require user authentication, since they're specific to a
/// certain user. [AuthorizationCodeUserClient](crate::client::authorization_code::AuthorizationCodeUserClient)
/// implements this trait.
///
/// Functions that take [lookups](Lookup) in bulk resolve every one of them before sending anything. A query that finds
/// nothing is recorded in the returned [Collected] and left out of the request; any other failed lookup means nothing
/// is modified.
#[async_trait]
pub trait ScopedClient: UnscopedClient + private::UserAuthenticatedClient {
    /// Get the tracks saved in the user's library.
    ///
    /// Required scope: [UserLibraryRead](crate::scope::Scope::UserLibraryRead).
    async fn saved_tracks(&self, limit: FetchLimit) -> Result<Collected<Track>> {
        let saved: Collected<SavedTrack> = collect_offset(self, API_SAVED_TRACKS_PATH, limit).await?;
        Ok(saved.map(|saved| saved.track))
    }

    /// Get the albums saved in the user's library.
    ///
    /// Required scope: [UserLibraryRead](crate::scope::Scope::UserLibraryRead).
    async fn saved_albums(&self, limit: FetchLimit) -> Result<Collected<Album>> {
        let saved: Collected<SavedAlbum> = collect_offset(self, API_SAVED_ALBUMS_PATH, limit).await?;
        Ok(saved.map(|saved| saved.album))
    }

    /// Get the playlists the user owns or follows.
    ///
    /// Required scope: [PlaylistReadPrivate](crate::scope::Scope::PlaylistReadPrivate) for private playlists.
    async fn saved_playlists(&self, limit: FetchLimit) -> Result<Collected<Playlist>> {
        collect_offset(self, API_SAVED_PLAYLISTS_PATH, limit).await
    }

    /// Get the artists the user follows. The collection is cursor-based, so a failed page ends the fetch.
    ///
    /// Required scope: [UserFollowRead](crate::scope::Scope::UserFollowRead).
    async fn followed_artists(&self, limit: FetchLimit) -> Result<Collected<Artist>> {
        let client = self;
        let url = client.config().api_url(API_FOLLOWED_ARTISTS_PATH)?;

        collect_pages(limit, MAX_PAGE_SIZE, Position::Cursor(None), move |request| {
            let url = url.clone();
            async move {
                let body: FollowedArtists = fetch_page(client, url, &request).await?;
                Ok(PageChunk::from_page(body.artists))
            }
        })
        .await
    }

    /// Get the entries in a playlist.
    async fn playlist_tracks(&self, playlist: Lookup<'_, Playlist>, limit: FetchLimit) -> Result<Collected<PlaylistItem>> {
        let id = resolve_id(self, &playlist).await?;
        collect_offset(self, &format!("playlists/{}/tracks", id), limit).await
    }

    /// The number of tracks in the user's library.
    async fn saved_tracks_total(&self) -> Result<usize> {
        offset_total(self, API_SAVED_TRACKS_PATH).await
    }

    async fn saved_albums_total(&self) -> Result<usize> {
        offset_total(self, API_SAVED_ALBUMS_PATH).await
    }

    async fn saved_playlists_total(&self) -> Result<usize> {
        offset_total(self, API_SAVED_PLAYLISTS_PATH).await
    }

    /// The number of followed artists, or `None` if the server doesn't report it.
    async fn followed_artists_total(&self) -> Result<Option<usize>> {
        let url = self.config().api_url(API_FOLLOWED_ARTISTS_PATH)?;
        let probe = PageRequest {
            position: Position::Cursor(None),
            limit: 1,
        };

        let body: FollowedArtists = fetch_page(self, url, &probe).await?;
        Ok(body.artists.total.map(|total| total as usize))
    }

    /// Save tracks to the user's library.
    ///
    /// Required scope: [UserLibraryModify](crate::scope::Scope::UserLibraryModify).
    async fn save_tracks(&self, tracks: &[Lookup<'_, Track>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, tracks).await?;
        modify_batch(self, Method::PUT, API_SAVED_TRACKS_PATH, ids.items(), TRACK_BATCH_SIZE).await?;

        Ok(ids)
    }

    async fn unsave_tracks(&self, tracks: &[Lookup<'_, Track>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, tracks).await?;
        modify_batch(self, Method::DELETE, API_SAVED_TRACKS_PATH, ids.items(), TRACK_BATCH_SIZE).await?;

        Ok(ids)
    }

    /// Save albums to the user's library.
    ///
    /// Required scope: [UserLibraryModify](crate::scope::Scope::UserLibraryModify).
    async fn save_albums(&self, albums: &[Lookup<'_, Album>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, albums).await?;
        modify_batch(self, Method::PUT, API_SAVED_ALBUMS_PATH, ids.items(), ALBUM_BATCH_SIZE).await?;

        Ok(ids)
    }

    async fn unsave_albums(&self, albums: &[Lookup<'_, Album>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, albums).await?;
        modify_batch(self, Method::DELETE, API_SAVED_ALBUMS_PATH, ids.items(), ALBUM_BATCH_SIZE).await?;

        Ok(ids)
    }

    /// Follow artists.
    ///
    /// Required scope: [UserFollowModify](crate::scope::Scope::UserFollowModify).
    async fn follow_artists(&self, artists: &[Lookup<'_, Artist>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, artists).await?;
        modify_batch(self, Method::PUT, API_FOLLOWED_ARTISTS_PATH, ids.items(), FOLLOW_BATCH_SIZE).await?;

        Ok(ids)
    }

    async fn unfollow_artists(&self, artists: &[Lookup<'_, Artist>]) -> Result<Collected<SpotifyId>> {
        let ids = resolve_all(self, artists).await?;
        modify_batch(self, Method::DELETE, API_FOLLOWED_ARTISTS_PATH, ids.items(), FOLLOW_BATCH_SIZE).await?;

        Ok(ids)
    }

    /// Follow users by their ID or URI. Users cannot be searched for.
    ///
    /// Required scope: [UserFollowModify](crate::scope::Scope::UserFollowModify).
    async fn follow_users(&self, users: &[&str]) -> Result<()> {
        let ids = parse_user_ids(users)?;
        modify_batch(self, Method::PUT, "me/following?type=user", &ids, FOLLOW_BATCH_SIZE).await
    }

    async fn unfollow_users(&self, users: &[&str]) -> Result<()> {
        let ids = parse_user_ids(users)?;
        modify_batch(self, Method::DELETE, "me/following?type=user", &ids, FOLLOW_BATCH_SIZE).await
    }

    /// Follow playlists, one request per playlist. Returns the IDs of the playlists that were followed.
    ///
    /// A query that finds nothing is recorded and skipped. Any other failure is recorded and stops the rest of the
    /// playlists from being followed.
    ///
    /// Required scope: [PlaylistModifyPublic](crate::scope::Scope::PlaylistModifyPublic) or
    /// [PlaylistModifyPrivate](crate::scope::Scope::PlaylistModifyPrivate).
    async fn save_playlists(&self, playlists: &[Lookup<'_, Playlist>]) -> Collected<SpotifyId> {
        modify_playlist_follows(self, Method::PUT, playlists).await
    }

    async fn unsave_playlists(&self, playlists: &[Lookup<'_, Playlist>]) -> Collected<SpotifyId> {
        modify_playlist_follows(self, Method::DELETE, playlists).await
    }

    /// Check whether each track is saved in the user's library. Each resolved ID is paired with its result, in the same
    /// order as the lookups.
    ///
    /// Required scope: [UserLibraryRead](crate::scope::Scope::UserLibraryRead).
    async fn has_saved_tracks(&self, tracks: &[Lookup<'_, Track>]) -> Result<Collected<(SpotifyId, bool)>> {
        let ids = resolve_all(self, tracks).await?;
        let flags = contains_batch(self, "me/tracks/contains", ids.items(), TRACK_BATCH_SIZE).await?;

        Ok(ids.zip(flags))
    }

    async fn has_saved_albums(&self, albums: &[Lookup<'_, Album>]) -> Result<Collected<(SpotifyId, bool)>> {
        let ids = resolve_all(self, albums).await?;
        let flags = contains_batch(self, "me/albums/contains", ids.items(), ALBUM_BATCH_SIZE).await?;

        Ok(ids.zip(flags))
    }

    /// Check whether the user follows each artist.
    ///
    /// Required scope: [UserFollowRead](crate::scope::Scope::UserFollowRead).
    async fn follows_artists(&self, artists: &[Lookup<'_, Artist>]) -> Result<Collected<(SpotifyId, bool)>> {
        let ids = resolve_all(self, artists).await?;
        let flags = contains_batch(self, "me/following/contains?type=artist", ids.items(), FOLLOW_BATCH_SIZE).await?;

        Ok(ids.zip(flags))
    }

    /// Get audio features, such as danceability, energy and valence, for a track.
    async fn audio_features(&self, track: Lookup<'_, Track>) -> Result<AudioFeatures> {
        let id = resolve_id(self, &track).await?;
        let url = self.config().api_url(&format!("audio-features/{}", id))?;

        ApiRequest::get(self, url).send_expecting().await
    }

    /// Get the low-level audio analysis of a track: its structure and musical content.
    async fn audio_analysis(&self, track: Lookup<'_, Track>) -> Result<AudioAnalysis> {
        let id = resolve_id(self, &track).await?;
        let url = self.config().api_url(&format!("audio-analysis/{}", id))?;

        ApiRequest::get(self, url).send_expecting().await
    }

    /// Get the current user's profile.
    ///
    /// The email address and country are only included with the [UserReadEmail](crate::scope::Scope::UserReadEmail)
    /// and [UserReadPrivate](crate::scope::Scope::UserReadPrivate) scopes.
    async fn current_user_profile(&self) -> Result<PrivateUser> {
        let url = self.config().api_url(API_CURRENT_USER_PATH)?;
        ApiRequest::get(self, url).send_expecting().await
    }

    /// Get information about the user's available devices.
    ///
    /// Required scope: [UserReadPlaybackState](crate::scope::Scope::UserReadPlaybackState).
    async fn devices(&self) -> Result<Vec<Device>> {
        let url = self.config().api_url(API_PLAYER_DEVICES_PATH)?;
        let devices: Option<Devices> = ApiRequest::get(self, url).send_json().await?;
        trace!("Devices: {:?}", devices);

        Ok(devices.map(|devices| devices.devices).unwrap_or_default())
    }

    /// Transfer playback to another device. If `play` is true, playback starts on the new device; otherwise the
    /// current playback state is kept.
    ///
    /// Required scope: [UserModifyPlaybackState](crate::scope::Scope::UserModifyPlaybackState).
    async fn transfer_playback(&self, device: DeviceTarget<'_>, play: bool) -> Result<()> {
        let device_id = match device {
            DeviceTarget::Id(id) => id,
            DeviceTarget::Device(device) => device.id().ok_or_else(|| {
                Error::InvalidArgument(format!("device {:?} has no ID and cannot be transferred to", device.name()))
            })?,
        };

        let body = TransferPlaybackBody {
            device_ids: [device_id],
            play,
        };

        debug!("Transferring playback to {}", device_id);

        let url = self.config().api_url(API_PLAYER_PATH)?;
        ApiRequest::new(self, Method::PUT, url)
            .json(&body)
            .accept_status(StatusCode::NO_CONTENT)
            .send()
            .await
    }
}

async fn collect_offset<C, T>(client: &C, path: &str, limit: FetchLimit) -> Result<Collected<T>>
where
    C: ScopedClient,
    T: DeserializeOwned + Send,
{
    let url = client.config().api_url(path)?;

    collect_pages(limit, MAX_PAGE_SIZE, Position::Offset(0), move |request| {
        let url = url.clone();
        async move {
            let page: Page<T> = fetch_page(client, url, &request).await?;
            Ok(PageChunk::from_page(page))
        }
    })
    .await
}

async fn offset_total<C>(client: &C, path: &str) -> Result<usize>
where
    C: ScopedClient,
{
    let url = client.config().api_url(path)?;
    let probe = PageRequest {
        position: Position::Offset(0),
        limit: 1,
    };

    let page: Page<IgnoredAny> = fetch_page(client, url, &probe).await?;
    Ok(page.total as usize)
}

async fn modify_batch<C>(client: &C, method: Method, path: &str, ids: &[SpotifyId], batch_size: usize) -> Result<()>
where
    C: ScopedClient,
{
    for batch in ids.chunks(batch_size) {
        let mut url = client.config().api_url(path)?;
        url.query_pairs_mut().append_pair("ids", &join_ids(batch));

        debug!("{} {} IDs at {}", method, batch.len(), path);
        ApiRequest::new(client, method.clone(), url).send().await?;
    }

    Ok(())
}

async fn contains_batch<C>(client: &C, path: &str, ids: &[SpotifyId], batch_size: usize) -> Result<Vec<bool>>
where
    C: ScopedClient,
{
    let mut contains = Vec::with_capacity(ids.len());

    for batch in ids.chunks(batch_size) {
        let mut url = client.config().api_url(path)?;
        url.query_pairs_mut().append_pair("ids", &join_ids(batch));

        let flags: Vec<bool> = ApiRequest::get(client, url).send_expecting().await?;
        contains.extend(flags);
    }

    Ok(contains)
}

async fn modify_playlist_follows<C>(client: &C, method: Method, playlists: &[Lookup<'_, Playlist>]) -> Collected<SpotifyId>
where
    C: ScopedClient,
{
    let mut collected = Collected::default();

    for playlist in playlists {
        let id = match resolve_id(client, playlist).await {
            Ok(id) => id,
            Err(err @ Error::NoSearchResults { .. }) => {
                collected.fail(err);
                continue;
            }
            Err(err) => {
                collected.fail(err);
                break;
            }
        };

        match modify_playlist_follow(client, method.clone(), &id).await {
            Ok(()) => collected.push(id),
            Err(err) => {
                collected.fail(err);
                break;
            }
        }
    }

    collected
}

async fn modify_playlist_follow<C>(client: &C, method: Method, id: &SpotifyId) -> Result<()>
where
    C: ScopedClient,
{
    let url = client.config().api_url(&format!("playlists/{}/followers", id))?;

    debug!("{} follow for playlist {}", method, id);
    ApiRequest::new(client, method, url).send().await
}

fn parse_user_ids(users: &[&str]) -> Result<Vec<SpotifyId>> {
    users
        .iter()
        .map(|user| SpotifyId::parse(ItemType::User, user).map_err(Error::from))
        .collect()
}
