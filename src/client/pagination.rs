//! Fetching whole collections from paginated endpoints.
//!
//! Spotify returns at most 50 items per page. [collect_pages] walks an offset- or cursor-based collection page by page
//! until the requested number of items has been gathered, the server's total is reached or the cursor runs out.

use std::{convert::TryFrom, future::Future};

use log::{debug, warn};
use reqwest::Url;
use serde::de::DeserializeOwned;

use super::{
    private::{AccessTokenExpiry, BuildHttpRequest},
    request::ApiRequest,
};
use crate::{
    error::{Error, Result},
    model::page::PageInformation,
};

/// The largest page Spotify serves.
pub const MAX_PAGE_SIZE: u32 = 50;

/// How many items to fetch from a paginated collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchLimit {
    /// Every item in the collection. Costs one extra request to learn the collection's size.
    All,
    /// At most this many items.
    Count(usize),
}

/// Where a page starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Position {
    Offset(u32),
    /// An opaque cursor from the previous page; `None` for the first page.
    Cursor(Option<String>),
}

/// One page to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub position: Position,
    pub limit: u32,
}

/// The parts of a fetched page the fetcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageChunk<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub next_cursor: Option<String>,
}

/// Items gathered from one or more requests, along with the requests that failed along the way.
///
/// An empty collection with no failures means nothing was found; failures mean some of the items could not be
/// retrieved.
#[derive(Debug)]
pub struct Collected<T> {
    items: Vec<T>,
    failures: Vec<Error>,
}

impl TryFrom<i64> for FetchLimit {
    type Error = Error;

    fn try_from(limit: i64) -> Result<Self> {
        usize::try_from(limit)
            .map(FetchLimit::Count)
            .map_err(|_| Error::InvalidArgument(format!("fetch limit must not be negative, got {}", limit)))
    }
}

impl From<usize> for FetchLimit {
    fn from(limit: usize) -> Self {
        FetchLimit::Count(limit)
    }
}

impl<T> PageChunk<T> {
    pub fn from_page<P>(page: P) -> Self
    where
        P: PageInformation<T>,
    {
        let total = page.total();
        let next_cursor = page.next_cursor().map(str::to_owned);

        Self {
            items: page.take_items(),
            total,
            next_cursor,
        }
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Collected<T> {
    pub(crate) fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub(crate) fn fail(&mut self, err: Error) {
        warn!("Collecting item failed: {}", err);
        self.failures.push(err);
    }

    pub(crate) fn record(&mut self, result: Result<T>) {
        match result {
            Ok(item) => self.push(item),
            Err(err) => self.fail(err),
        }
    }

    /// The successfully retrieved items, in request order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// The errors of the requests that failed.
    pub fn failures(&self) -> &[Error] {
        &self.failures
    }

    /// Whether every request succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Return the items if every request succeeded, otherwise the first failure.
    pub fn into_result(self) -> Result<Vec<T>> {
        match self.failures.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.items),
        }
    }

    pub fn map<U, F>(self, f: F) -> Collected<U>
    where
        F: FnMut(T) -> U,
    {
        Collected {
            items: self.items.into_iter().map(f).collect(),
            failures: self.failures,
        }
    }

    /// Pair each item with the value at the same position in `values`.
    pub(crate) fn zip<U>(self, values: Vec<U>) -> Collected<(T, U)> {
        Collected {
            items: self.items.into_iter().zip(values).collect(),
            failures: self.failures,
        }
    }
}

/// Fetch up to `limit` items starting from `start`, requesting at most `page_size` items per page.
///
/// Failed pages are recorded in the returned [Collected]. An offset fetch skips past a failed page; a cursor fetch
/// cannot and stops there.
pub(crate) async fn collect_pages<T, F, Fut>(
    limit: FetchLimit,
    page_size: u32,
    start: Position,
    mut fetch_page: F,
) -> Result<Collected<T>>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<PageChunk<T>>>,
{
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(Error::InvalidArgument(format!(
            "page size must be between 1 and {}, got {}",
            MAX_PAGE_SIZE, page_size
        )));
    }

    let mut collected = Collected::default();

    let mut remaining = match limit {
        FetchLimit::Count(count) => count,
        FetchLimit::All => {
            let probe = PageRequest {
                position: start.clone(),
                limit: 1,
            };

            match fetch_page(probe).await {
                Ok(chunk) => {
                    debug!("Collection reports {} items in total", chunk.total);
                    chunk.total
                }

                Err(err) => {
                    collected.fail(err);
                    0
                }
            }
        }
    };

    let base_offset = match start {
        Position::Offset(offset) => offset as usize,
        Position::Cursor(_) => 0,
    };

    let mut position = start;
    let mut consumed = 0;

    while remaining > 0 {
        let request_size = remaining.min(page_size as usize);
        let request = PageRequest {
            position: position.clone(),
            limit: request_size as u32,
        };

        debug!("Requesting page at {:?} with limit {}", request.position, request.limit);

        match fetch_page(request).await {
            Ok(chunk) => {
                // the server's total bounds how many items are left from here on
                remaining = remaining.min(chunk.total.saturating_sub(base_offset + consumed));

                let take = request_size.min(remaining);
                collected.items.extend(chunk.items.into_iter().take(take));
                remaining -= take;
                consumed += request_size;

                position = match position {
                    Position::Offset(offset) => Position::Offset(offset + request_size as u32),
                    Position::Cursor(_) => match chunk.next_cursor {
                        Some(cursor) => Position::Cursor(Some(cursor)),
                        None => {
                            if remaining > 0 {
                                debug!("Cursor exhausted with {} items left unfetched", remaining);
                            }

                            break;
                        }
                    },
                };
            }

            Err(err) => {
                collected.fail(err);

                match position {
                    Position::Offset(offset) => {
                        remaining -= request_size;
                        consumed += request_size;
                        position = Position::Offset(offset + request_size as u32);
                    }

                    Position::Cursor(_) => {
                        warn!("Cannot continue a cursor-based fetch past a failed page");
                        break;
                    }
                }
            }
        }
    }

    Ok(collected)
}

/// Fetch a single page of `R` from `url` with the page position and limit added to its query.
pub(crate) async fn fetch_page<C, R>(client: &C, mut url: Url, request: &PageRequest) -> Result<R>
where
    C: BuildHttpRequest + AccessTokenExpiry + Sync + ?Sized,
    R: DeserializeOwned,
{
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("limit", &request.limit.to_string());

        match &request.position {
            Position::Offset(offset) => {
                query.append_pair("offset", &offset.to_string());
            }

            Position::Cursor(Some(after)) => {
                query.append_pair("after", after);
            }

            Position::Cursor(None) => {}
        }
    }

    ApiRequest::get(client, url).send_expecting().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    /// A collection of `total` numbered items served in whatever pages are requested.
    struct FakeSource {
        total: usize,
        requests: RefCell<Vec<PageRequest>>,
        fail_offsets: Vec<u32>,
        // cursor pages: after which page index the cursor is empty
        cursor_ends_after: Option<usize>,
    }

    impl FakeSource {
        fn new(total: usize) -> Self {
            Self {
                total,
                requests: RefCell::new(Vec::new()),
                fail_offsets: Vec::new(),
                cursor_ends_after: None,
            }
        }

        fn fetch(&self, request: PageRequest) -> Result<PageChunk<usize>> {
            self.requests.borrow_mut().push(request.clone());

            let start = match &request.position {
                Position::Offset(offset) => {
                    if self.fail_offsets.contains(offset) {
                        return Err(Error::Api {
                            status: 500,
                            message: String::from("boom"),
                        });
                    }

                    *offset as usize
                }

                Position::Cursor(None) => 0,
                Position::Cursor(Some(cursor)) => cursor.parse().unwrap(),
            };

            let end = (start + request.limit as usize).min(self.total);
            let page_index = self.requests.borrow().len();

            let next_cursor = match self.cursor_ends_after {
                Some(last) if page_index >= last => None,
                _ if end < self.total => Some(end.to_string()),
                _ => None,
            };

            Ok(PageChunk {
                items: (start..end).collect(),
                total: self.total,
                next_cursor,
            })
        }

        fn offsets_and_limits(&self) -> Vec<(u32, u32)> {
            self.requests
                .borrow()
                .iter()
                .map(|request| match request.position {
                    Position::Offset(offset) => (offset, request.limit),
                    Position::Cursor(_) => panic!("expected an offset request"),
                })
                .collect()
        }
    }

    async fn collect(source: &FakeSource, limit: FetchLimit, page_size: u32, start: Position) -> Collected<usize> {
        collect_pages(limit, page_size, start, |request| {
            let result = source.fetch(request);
            async move { result }
        })
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn splits_limit_into_full_pages_and_remainder() {
        let source = FakeSource::new(500);
        let collected = collect(&source, FetchLimit::Count(120), 50, Position::Offset(0)).await;

        assert_eq!(source.offsets_and_limits(), vec![(0, 50), (50, 50), (100, 20)]);
        assert_eq!(collected.items().len(), 120);
        assert_eq!(collected.into_items(), (0..120).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn request_count_is_limit_over_page_size_rounded_up() {
        for (limit, page_size) in [(1, 50), (50, 50), (51, 50), (99, 10), (7, 3), (100, 1)] {
            let source = FakeSource::new(1000);
            let collected = collect(&source, FetchLimit::Count(limit), page_size, Position::Offset(0)).await;

            let expected_requests = (limit + page_size as usize - 1) / page_size as usize;
            assert_eq!(source.requests.borrow().len(), expected_requests, "limit {limit} page size {page_size}");
            assert_eq!(collected.items().len(), limit);
        }
    }

    #[tokio::test]
    async fn zero_limit_sends_nothing() {
        let source = FakeSource::new(10);
        let collected = collect(&source, FetchLimit::Count(0), 50, Position::Offset(0)).await;

        assert!(source.requests.borrow().is_empty());
        assert!(collected.items().is_empty());
        assert!(collected.is_complete());
    }

    #[tokio::test]
    async fn fetch_all_probes_total_first() {
        let source = FakeSource::new(73);
        let collected = collect(&source, FetchLimit::All, 50, Position::Offset(0)).await;

        assert_eq!(source.offsets_and_limits(), vec![(0, 1), (0, 50), (50, 23)]);
        assert_eq!(collected.items().len(), 73);
    }

    #[tokio::test]
    async fn limit_is_clamped_by_server_total() {
        let source = FakeSource::new(30);
        let collected = collect(&source, FetchLimit::Count(120), 20, Position::Offset(0)).await;

        assert_eq!(source.offsets_and_limits(), vec![(0, 20), (20, 10)]);
        assert_eq!(collected.items().len(), 30);
    }

    #[tokio::test]
    async fn offset_fetch_continues_past_failed_page() {
        let mut source = FakeSource::new(150);
        source.fail_offsets = vec![50];

        let collected = collect(&source, FetchLimit::Count(150), 50, Position::Offset(0)).await;

        assert_eq!(source.offsets_and_limits(), vec![(0, 50), (50, 50), (100, 50)]);
        assert_eq!(collected.items().len(), 100);
        assert_eq!(collected.failures().len(), 1);
        assert!(!collected.is_complete());
    }

    #[tokio::test]
    async fn failed_probe_fetches_nothing() {
        let mut source = FakeSource::new(150);
        source.fail_offsets = vec![0];

        let collected = collect(&source, FetchLimit::All, 50, Position::Offset(0)).await;

        assert_eq!(source.requests.borrow().len(), 1);
        assert!(collected.items().is_empty());
        assert!(collected.into_result().is_err());
    }

    #[tokio::test]
    async fn cursor_fetch_stops_when_cursor_runs_out() {
        let mut source = FakeSource::new(500);
        source.cursor_ends_after = Some(2);

        let collected = collect(&source, FetchLimit::Count(150), 50, Position::Cursor(None)).await;

        assert_eq!(source.requests.borrow().len(), 2);
        assert_eq!(collected.into_items(), (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn cursor_fetch_follows_cursor() {
        let source = FakeSource::new(120);
        let collected = collect(&source, FetchLimit::Count(120), 50, Position::Cursor(None)).await;

        let positions: Vec<_> = source
            .requests
            .borrow()
            .iter()
            .map(|request| request.position.clone())
            .collect();

        assert_eq!(
            positions,
            vec![
                Position::Cursor(None),
                Position::Cursor(Some(String::from("50"))),
                Position::Cursor(Some(String::from("100")))
            ]
        );
        assert_eq!(collected.items().len(), 120);
    }

    #[tokio::test]
    async fn invalid_page_sizes_are_rejected() {
        for page_size in [0, 51] {
            let result = collect_pages(FetchLimit::All, page_size, Position::Offset(0), |_| async {
                Ok(PageChunk::<u32> {
                    items: Vec::new(),
                    total: 0,
                    next_cursor: None,
                })
            })
            .await;

            assert!(matches!(result, Err(Error::InvalidArgument(_))));
        }
    }

    #[test]
    fn negative_limit_is_rejected() {
        assert!(matches!(FetchLimit::try_from(-1i64), Err(Error::InvalidArgument(_))));
        assert_eq!(FetchLimit::try_from(20i64).unwrap(), FetchLimit::Count(20));
    }
}
