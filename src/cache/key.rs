//! Structured cache keys for feed queries.
//!
//! Keys are plain values compared field-by-field rather than concatenated
//! strings, so "invalidate everything for articles" can never accidentally
//! match a different resource whose name happens to share a prefix.

use std::fmt;

/// A listable collection on the Agora backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
  Articles,
  Projects,
  Threads,
  Replies,
  Comments,
}

impl Resource {
  /// Path segment used in API endpoints.
  pub fn as_str(&self) -> &'static str {
    match self {
      Resource::Articles => "articles",
      Resource::Projects => "projects",
      Resource::Threads => "threads",
      Resource::Replies => "replies",
      Resource::Comments => "comments",
    }
  }
}

impl fmt::Display for Resource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Sort column for a feed query. Values are expected to be effectively unique
/// at page-boundary granularity (timestamps in practice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
  CreatedAt,
  UpdatedAt,
  Title,
  LikeCount,
}

impl SortField {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortField::CreatedAt => "created_at",
      SortField::UpdatedAt => "updated_at",
      SortField::Title => "title",
      SortField::LikeCount => "like_count",
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
  Asc,
  Desc,
}

impl SortDirection {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortDirection::Asc => "asc",
      SortDirection::Desc => "desc",
    }
  }
}

/// Cache key for the unparameterized first page of a feed query.
///
/// Cursor-bound pages are deliberately not cacheable: their keys would have to
/// embed cursor values, multiplying key cardinality for pages the user is
/// unlikely to revisit verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeedKey {
  pub resource: Resource,
  pub sort_field: SortField,
  pub direction: SortDirection,
  pub page_size: u32,
}

impl fmt::Display for FeedKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}:{}",
      self.resource,
      self.sort_field.as_str(),
      self.direction.as_str(),
      self.page_size
    )
  }
}
