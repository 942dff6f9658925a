use std::borrow::Cow;

use log::trace;

use crate::{
    client::{
        private::{AccessTokenExpiry, BuildHttpRequest},
        request::ApiRequest,
    },
    error::Result,
    model::search::{SearchResults, ToTypesString, DEFAULT_SEARCH_LIMIT, DEFAULT_SEARCH_OFFSET, DEFAULT_SEARCH_TYPES_STRING},
};

const API_SEARCH_PATH: &str = "search";

/// A builder for a search in Spotify's catalog. New instances are returned by the
/// [search-function](super::UnscopedClient::search) in [UnscopedClient](super::UnscopedClient).
pub struct SearchBuilder<'a, C, S>
where
    C: ?Sized,
    S: AsRef<str>,
{
    client: &'a C,
    query: S,
    types: Cow<'a, str>,
    limit: u32,
    offset: u32,
    market: Option<String>,
}

impl<'a, C, S> SearchBuilder<'a, C, S>
where
    C: ?Sized,
    S: AsRef<str>,
{
    pub(crate) fn new(client: &'a C, query: S) -> Self {
        Self {
            client,
            query,
            types: Cow::Borrowed(DEFAULT_SEARCH_TYPES_STRING),
            limit: DEFAULT_SEARCH_LIMIT,
            offset: DEFAULT_SEARCH_OFFSET,
            market: None,
        }
    }

    /// Set specific Spotify item types to search for. The `types` parameter can be any iterator of
    /// [ItemType](crate::model::ItemType)-enums.
    ///
    /// By default, albums, artists, playlists and tracks are searched for.
    pub fn types<T>(self, types: T) -> Self
    where
        T: ToTypesString,
    {
        Self {
            types: Cow::Owned(types.to_types_string()),
            ..self
        }
    }

    /// The maximum number of results to return in each item type.
    ///
    /// Default: 20. Maximum: 50.
    pub fn limit(self, limit: u32) -> Self {
        Self { limit, ..self }
    }

    /// The index of the first result to return. By combining this with [limit](SearchBuilder::limit), you may request
    /// new pages of content.
    ///
    /// Default: 0.
    pub fn offset(self, offset: u32) -> Self {
        Self { offset, ..self }
    }

    /// Specify an ISO 3166-1 alpha-2 country code such that content that is available in that market will be returned.
    /// If using an user-authenticated client, the country associated with the corresponding user account will take
    /// priority over this parameter.
    pub fn market<M>(self, market: M) -> Self
    where
        M: Into<String>,
    {
        Self {
            market: Some(market.into()),
            ..self
        }
    }
}

impl<'a, C, S> SearchBuilder<'a, C, S>
where
    C: BuildHttpRequest + AccessTokenExpiry + Sync + ?Sized,
    S: AsRef<str>,
{
    /// Send the search and return a collection of results.
    pub async fn send(self) -> Result<SearchResults> {
        let mut url = self.client.config().api_url(API_SEARCH_PATH)?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("q", self.query.as_ref())
                .append_pair("type", &self.types)
                .append_pair("limit", &self.limit.to_string())
                .append_pair("offset", &self.offset.to_string());

            if let Some(market) = self.market.as_deref() {
                query.append_pair("market", market);
            }
        }

        trace!("Search URL: {}", url);

        let search_results = ApiRequest::get(self.client, url).send_json().await?;
        trace!("Search results object: {:?}", search_results);

        Ok(search_results.unwrap_or_default())
    }
}
