use serde::Deserialize;

/// A trait describing a page-like object returned from Spotify's paginated endpoints.
///
/// You do not have to use this trait directly.
#[doc(hidden)]
pub trait PageInformation<T>
where
    Self: crate::private::Sealed,
{
    /// Return the items in this page.
    fn items(&self) -> &[T];

    /// Return the items in this page while consuming the page.
    fn take_items(self) -> Vec<T>;

    /// The total number of items in the collection as reported by the server.
    fn total(&self) -> usize;

    /// The cursor to the next page, if the collection is cursor-based and there are more items.
    fn next_cursor(&self) -> Option<&str>;
}

/// An offset-based page of items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u32,
    #[serde(default)]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
}

/// A cursor-based page of items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CursorPage<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub limit: u32,
    pub next: Option<String>,
    #[serde(default)]
    pub cursors: Cursors,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct Cursors {
    pub after: Option<String>,
    pub before: Option<String>,
}

impl<T> crate::private::Sealed for Page<T> {}
impl<T> crate::private::Sealed for CursorPage<T> {}

impl<T> PageInformation<T> for Page<T> {
    fn items(&self) -> &[T] {
        &self.items
    }

    fn take_items(self) -> Vec<T> {
        self.items
    }

    fn total(&self) -> usize {
        self.total as usize
    }

    fn next_cursor(&self) -> Option<&str> {
        None
    }
}

impl<T> PageInformation<T> for CursorPage<T> {
    fn items(&self) -> &[T] {
        &self.items
    }

    fn take_items(self) -> Vec<T> {
        self.items
    }

    fn total(&self) -> usize {
        // a cursor page without a total is bounded only by its cursor
        self.total.map_or(usize::MAX, |total| total as usize)
    }

    fn next_cursor(&self) -> Option<&str> {
        self.cursors.after.as_deref().filter(|after| !after.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_after_cursor_is_exhausted() {
        let page: CursorPage<u32> = serde_json::from_value(json!({
            "items": [1, 2],
            "total": 2,
            "limit": 50,
            "next": null,
            "cursors": { "after": "" }
        }))
        .unwrap();

        assert_eq!(page.next_cursor(), None);
        assert_eq!(page.total(), 2);
    }

    #[test]
    fn offset_page_total() {
        let page: Page<u32> = serde_json::from_value(json!({
            "items": [1],
            "total": 120,
            "limit": 1,
            "offset": 0,
            "next": "https://api.spotify.com/v1/me/tracks?offset=1&limit=1",
            "previous": null
        }))
        .unwrap();

        assert_eq!(page.total(), 120);
        assert_eq!(page.take_items(), vec![1]);
    }
}
