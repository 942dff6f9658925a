//! Turning the different ways of referring to a catalog item into a Spotify ID.

use std::borrow::Cow;

use log::{debug, warn};
use serde::de::DeserializeOwned;

use super::{pagination::Collected, unscoped::UnscopedClient};
use crate::{
    error::{Error, Result},
    model::{
        album::Album, artist::Artist, id::SpotifyId, playlist::Playlist, search::SearchResults, track::Track,
        ItemType,
    },
};

/// A reference to a catalog item of type `T`.
///
/// A [Query](Lookup::Query) is resolved by searching the catalog and using the first result, so it costs one extra
/// request. An [Id](Lookup::Id) or a [Record](Lookup::Record) is resolved locally without any network calls.
///
/// ```
/// # use spotirs::client::Lookup;
/// # use spotirs::model::track::Track;
/// let by_name: Lookup<Track> = "Disco Man Remi Wolf".into();
/// let by_id: Lookup<Track> = Lookup::id("spotify:track:2pDPOMX0kWA7kcPBcDCQBu");
/// ```
#[derive(Debug, Clone)]
pub enum Lookup<'a, T> {
    /// A search query. The more specific the query, the more likely the first result is the intended item.
    Query(Cow<'a, str>),
    /// A bare ID, an URI or an URL.
    Id(Cow<'a, str>),
    /// A previously retrieved record.
    Record(&'a T),
}

/// Catalog item types that can be searched for and referred to by a [Lookup].
pub trait Searchable: DeserializeOwned + Send + Sync + crate::private::Sealed {
    const ITEM_TYPE: ItemType;

    /// The record's ID, if it has one. Local tracks don't.
    fn record_id(&self) -> Option<&str>;

    /// Take the first search result of this type out of the results.
    fn first_result(results: SearchResults) -> Option<Self>;
}

impl<'a, T> Lookup<'a, T> {
    pub fn query<S>(query: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        Self::Query(query.into())
    }

    pub fn id<S>(id: S) -> Self
    where
        S: Into<Cow<'a, str>>,
    {
        Self::Id(id.into())
    }
}

impl<'a, T> From<&'a str> for Lookup<'a, T> {
    fn from(query: &'a str) -> Self {
        Self::Query(Cow::Borrowed(query))
    }
}

impl<'a, T> From<String> for Lookup<'a, T> {
    fn from(query: String) -> Self {
        Self::Query(Cow::Owned(query))
    }
}

macro_rules! searchable {
    ($ty:ty, $item_type:expr, $into_items:ident, |$record:ident| $id:expr) => {
        impl crate::private::Sealed for $ty {}

        impl Searchable for $ty {
            const ITEM_TYPE: ItemType = $item_type;

            fn record_id(&self) -> Option<&str> {
                let $record = self;
                $id
            }

            fn first_result(results: SearchResults) -> Option<Self> {
                results.$into_items().into_iter().next()
            }
        }

        impl<'a> From<&'a $ty> for Lookup<'a, $ty> {
            fn from(record: &'a $ty) -> Self {
                Self::Record(record)
            }
        }
    };
}

searchable!(Track, ItemType::Track, into_tracks, |track| track.id.as_deref());
searchable!(Album, ItemType::Album, into_albums, |album| Some(album.id.as_str()));
searchable!(Artist, ItemType::Artist, into_artists, |artist| Some(artist.id.as_str()));
searchable!(Playlist, ItemType::Playlist, into_playlists, |playlist| Some(playlist.id.as_str()));

/// Search for `query` and return the first result of type `T`.
pub(crate) async fn first_search_result<C, T>(client: &C, query: &str) -> Result<T>
where
    C: UnscopedClient,
    T: Searchable,
{
    if query.trim().is_empty() {
        return Err(Error::InvalidArgument(format!(
            "cannot search for a {} with an empty query",
            T::ITEM_TYPE
        )));
    }

    let results = client.search(query).types([T::ITEM_TYPE]).limit(1).send().await?;

    T::first_result(results).ok_or_else(|| {
        warn!("Search for {} {:?} returned no results", T::ITEM_TYPE, query);
        Error::NoSearchResults {
            kind: T::ITEM_TYPE,
            query: query.to_owned(),
        }
    })
}

/// Resolve a lookup into a validated ID. Only [queries](Lookup::Query) touch the network.
pub(crate) async fn resolve_id<C, T>(client: &C, lookup: &Lookup<'_, T>) -> Result<SpotifyId>
where
    C: UnscopedClient,
    T: Searchable,
{
    let id = match lookup {
        Lookup::Query(query) => {
            let record: T = first_search_result(client, query).await?;
            let id = record_id(&record)?;
            debug!("Resolved {} query {:?} to {}", T::ITEM_TYPE, query, id);
            id
        }

        Lookup::Id(id) => SpotifyId::parse(T::ITEM_TYPE, id)?,
        Lookup::Record(record) => record_id(*record)?,
    };

    Ok(id)
}

/// Resolve every lookup in order. A query that finds nothing is recorded as a failure and skipped; any other failure
/// stops the resolution and is returned.
pub(crate) async fn resolve_all<C, T>(client: &C, lookups: &[Lookup<'_, T>]) -> Result<Collected<SpotifyId>>
where
    C: UnscopedClient,
    T: Searchable,
{
    let mut resolved = Collected::default();

    for lookup in lookups {
        match resolve_id(client, lookup).await {
            Ok(id) => resolved.push(id),
            Err(err @ Error::NoSearchResults { .. }) => resolved.fail(err),
            Err(err) => return Err(err),
        }
    }

    Ok(resolved)
}

fn record_id<T>(record: &T) -> Result<SpotifyId>
where
    T: Searchable,
{
    let id = record
        .record_id()
        .ok_or_else(|| Error::InvalidArgument(format!("the {} record has no ID", T::ITEM_TYPE)))?;

    Ok(SpotifyId::from_bare(T::ITEM_TYPE, id)?)
}

/// Join IDs into the comma-separated form the batch endpoints take.
pub(crate) fn join_ids<'a, I>(ids: I) -> String
where
    I: IntoIterator<Item = &'a SpotifyId>,
{
    ids.into_iter().map(SpotifyId::as_str).collect::<Vec<_>>().join(",")
}
