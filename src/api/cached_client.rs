//! Cached platform client: read-through first pages, invalidation on writes.

use color_eyre::Result;
use std::sync::Arc;

use crate::api::client::PlatformClient;
use crate::cache::{FeedCache, Resource, SortDirection, SortField};
use crate::config::Config;
use crate::engagement::LikeController;
use crate::error::ApiError;
use crate::feed::{FeedItem, Pager};

/// Platform client with the shared feed cache attached.
///
/// Reads go through pagers wired to the cache; every write that could change
/// a first-page query result drops that resource's cached pages, so the next
/// read is forced back to the authoritative source.
#[derive(Clone)]
pub struct CachedClient {
  inner: PlatformClient,
  cache: Arc<FeedCache>,
  page_size: u32,
}

impl CachedClient {
  pub fn new(config: &Config) -> Result<Self> {
    Ok(Self {
      inner: PlatformClient::new(config)?,
      cache: Arc::new(FeedCache::new(config.cache_ttl())),
      page_size: config.page_size,
    })
  }

  /// The shared first-page cache.
  pub fn cache(&self) -> Arc<FeedCache> {
    Arc::clone(&self.cache)
  }

  /// Build a pager over `resource`, wired to this client and its cache.
  /// One pager per visible list.
  pub fn pager<T: FeedItem>(
    &self,
    resource: Resource,
    sort_field: SortField,
    direction: SortDirection,
  ) -> Pager<T> {
    let inner = self.inner.clone();
    Pager::new(resource, sort_field, direction, self.page_size, move |request| {
      let inner = inner.clone();
      async move { inner.fetch_page(&request).await }
    })
    .with_cache(self.cache())
  }

  /// Build a like controller wired to this client's toggle endpoint.
  /// One controller per visible list.
  pub fn like_controller(&self) -> LikeController {
    let inner = self.inner.clone();
    LikeController::new(move |entity_id: String| {
      let inner = inner.clone();
      async move { inner.toggle_like(&entity_id).await }
    })
  }

  /// Create a row, then invalidate the resource's cached first pages.
  pub async fn create(
    &self,
    resource: Resource,
    body: &serde_json::Value,
  ) -> Result<serde_json::Value, ApiError> {
    let row = self.inner.create_row(resource, body).await?;
    self.cache.invalidate_resource(resource);
    Ok(row)
  }

  /// Update a row, then invalidate the resource's cached first pages.
  pub async fn update(
    &self,
    resource: Resource,
    id: &str,
    body: &serde_json::Value,
  ) -> Result<serde_json::Value, ApiError> {
    let row = self.inner.update_row(resource, id, body).await?;
    self.cache.invalidate_resource(resource);
    Ok(row)
  }

  /// Delete a row, then invalidate the resource's cached first pages.
  pub async fn delete(&self, resource: Resource, id: &str) -> Result<(), ApiError> {
    self.inner.delete_row(resource, id).await?;
    self.cache.invalidate_resource(resource);
    Ok(())
  }

  /// Toggle a like. Counters are reconciled by the delta reconciler, not the
  /// cache, so no invalidation happens here.
  pub async fn toggle_like(&self, entity_id: &str) -> Result<bool, ApiError> {
    self.inner.toggle_like(entity_id).await
  }
}
