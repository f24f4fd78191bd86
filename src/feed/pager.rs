use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;

use crate::cache::{FeedCache, FeedKey, Resource, SortDirection, SortField};
use crate::error::ApiError;

/// Opaque page boundary: the sort-column value of the last item of a page,
/// valid only for the (resource, sort field, direction) it was captured under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor(String);

impl Cursor {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// One page query against the backend.
#[derive(Debug, Clone)]
pub struct PageRequest {
  pub resource: Resource,
  pub sort_field: SortField,
  pub direction: SortDirection,
  /// Row count to request; one more than the page size, so the extra row
  /// doubles as the has-more probe.
  pub limit: u32,
  /// Fetch rows strictly after this sort value, or from the start if None.
  pub after: Option<Cursor>,
}

/// A fetched, trimmed page.
#[derive(Debug, Clone)]
pub struct Page<T> {
  pub items: Vec<T>,
  pub has_more: bool,
  /// Boundary for the following page; None when the page is empty.
  pub next_cursor: Option<Cursor>,
}

/// An item that can appear in a paginated feed.
///
/// `sort_value` must return the item's value for the given sort column, the
/// same value the backend ordered by. Values are assumed effectively unique at
/// page boundaries (timestamps in practice); a shared boundary value may skip
/// or duplicate at most one row, which is accepted at these volumes.
pub trait FeedItem: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  fn id(&self) -> &str;
  fn sort_value(&self, field: SortField) -> String;
}

type FetchFuture<T> = BoxFuture<'static, Result<Vec<T>, ApiError>>;
type RowFetcher<T> = Box<dyn Fn(PageRequest) -> FetchFuture<T> + Send + Sync>;

/// Traversal state for one visible list.
#[derive(Debug)]
struct PageState<T> {
  items: Vec<T>,
  /// One entry per page boundary crossed; `history[i]` is the bound that
  /// starts page `i + 1`, so the stack always begins with None (page 1).
  cursor_history: Vec<Option<Cursor>>,
  /// 1-based.
  current_page: usize,
  has_more: bool,
  /// Sort value of the last item on the current page.
  trailing_cursor: Option<Cursor>,
}

impl<T> PageState<T> {
  fn new() -> Self {
    Self {
      items: Vec::new(),
      cursor_history: vec![None],
      current_page: 1,
      has_more: false,
      trailing_cursor: None,
    }
  }
}

/// Forward/backward paginator over one sorted remote collection.
///
/// The fetch seam is a boxed closure so tests (and the cached client) can
/// supply any row source. First pages are read through the shared
/// [`FeedCache`] when one is attached; cursor-bound pages always hit the
/// backend.
pub struct Pager<T: FeedItem> {
  resource: Resource,
  sort_field: SortField,
  direction: SortDirection,
  page_size: u32,
  fetcher: RowFetcher<T>,
  cache: Option<Arc<FeedCache>>,
  state: PageState<T>,
}

impl<T: FeedItem> Pager<T> {
  pub fn new<F, Fut>(
    resource: Resource,
    sort_field: SortField,
    direction: SortDirection,
    page_size: u32,
    fetcher: F,
  ) -> Self
  where
    F: Fn(PageRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Vec<T>, ApiError>> + Send + 'static,
  {
    Self {
      resource,
      sort_field,
      direction,
      page_size,
      fetcher: Box::new(move |request| Box::pin(fetcher(request))),
      cache: None,
      state: PageState::new(),
    }
  }

  /// Attach a shared first-page cache.
  pub fn with_cache(mut self, cache: Arc<FeedCache>) -> Self {
    self.cache = Some(cache);
    self
  }

  pub fn items(&self) -> &[T] {
    &self.state.items
  }

  /// 1-based index of the page currently held.
  pub fn current_page(&self) -> usize {
    self.state.current_page
  }

  pub fn has_more(&self) -> bool {
    self.state.has_more
  }

  pub fn sort_field(&self) -> SortField {
    self.sort_field
  }

  pub fn direction(&self) -> SortDirection {
    self.direction
  }

  /// Load (or reload) page 1, discarding any traversal history.
  pub async fn load_first_page(&mut self) -> Result<(), ApiError> {
    let rows = self.first_page_rows().await?;
    self.state = PageState::new();
    self.apply_rows(rows);
    Ok(())
  }

  /// Advance one page. Returns false without fetching when there is no next
  /// page.
  pub async fn next_page(&mut self) -> Result<bool, ApiError> {
    if !self.state.has_more {
      return Ok(false);
    }
    let cursor = self.state.trailing_cursor.clone();
    let rows = self.fetch_rows(cursor.clone()).await?;
    self.state.cursor_history.push(cursor);
    self.state.current_page += 1;
    self.apply_rows(rows);
    Ok(true)
  }

  /// Step back one page, re-deriving it from the stored cursor rather than
  /// any cached copy. Returns false when already on page 1.
  pub async fn prev_page(&mut self) -> Result<bool, ApiError> {
    if self.state.current_page <= 1 {
      return Ok(false);
    }
    // The bound that started the previous page sits two entries back: the
    // stack's last entry started the *current* page.
    let after = self
      .state
      .cursor_history
      .get(self.state.current_page - 2)
      .cloned()
      .flatten();
    let rows = match after {
      None => self.first_page_rows().await?,
      Some(cursor) => self.fetch_rows(Some(cursor)).await?,
    };
    self.state.cursor_history.pop();
    self.state.current_page -= 1;
    self.apply_rows(rows);
    Ok(true)
  }

  /// Change the sort criteria. Every captured cursor was computed against the
  /// old ordering, so the history is discarded and page 1 refetched.
  pub async fn reorder(
    &mut self,
    sort_field: SortField,
    direction: SortDirection,
  ) -> Result<(), ApiError> {
    self.sort_field = sort_field;
    self.direction = direction;
    self.load_first_page().await
  }

  fn feed_key(&self) -> FeedKey {
    FeedKey {
      resource: self.resource,
      sort_field: self.sort_field,
      direction: self.direction,
      page_size: self.page_size,
    }
  }

  /// First-page rows, read through the cache when one is attached. Cached
  /// pages keep the untrimmed `page_size + 1` rows so has-more detection
  /// works on a hit too.
  async fn first_page_rows(&self) -> Result<Vec<T>, ApiError> {
    let key = self.feed_key();
    if let Some(cache) = &self.cache {
      if let Some(raw) = cache.get(&key) {
        tracing::debug!(key = %key, "first page served from cache");
        return Ok(
          raw
            .into_iter()
            .filter_map(|row| serde_json::from_value(row).ok())
            .collect(),
        );
      }
    }

    let rows = self.fetch_rows(None).await?;

    if let Some(cache) = &self.cache {
      let raw: Vec<serde_json::Value> = rows
        .iter()
        .filter_map(|row| serde_json::to_value(row).ok())
        .collect();
      cache.set(key, raw);
    }
    Ok(rows)
  }

  /// Issue one query for `page_size + 1` rows. A vanished cursor is treated
  /// as "no bound": the fetch is retried unbounded, which may reorder results
  /// but never fails the traversal.
  async fn fetch_rows(&self, after: Option<Cursor>) -> Result<Vec<T>, ApiError> {
    let request = PageRequest {
      resource: self.resource,
      sort_field: self.sort_field,
      direction: self.direction,
      limit: self.page_size + 1,
      after,
    };

    match (self.fetcher)(request.clone()).await {
      Err(err) if err.is_cursor_gone() && request.after.is_some() => {
        tracing::warn!(
          resource = %request.resource,
          "pagination cursor vanished, refetching without bound"
        );
        let retry = PageRequest {
          after: None,
          ..request
        };
        (self.fetcher)(retry).await
      }
      other => other,
    }
  }

  /// Trim the has-more probe row and derive the trailing cursor.
  fn apply_rows(&mut self, mut rows: Vec<T>) {
    let page = self.page_size as usize;
    self.state.has_more = rows.len() > page;
    rows.truncate(page);
    self.state.trailing_cursor = rows
      .last()
      .map(|item| Cursor::new(item.sort_value(self.sort_field)));
    self.state.items = rows;
  }

  /// The trimmed view of the current page.
  pub fn page(&self) -> Page<T> {
    Page {
      items: self.state.items.clone(),
      has_more: self.state.has_more,
      next_cursor: self.state.trailing_cursor.clone(),
    }
  }
}
