//! Domain view models for Agora resources.
//!
//! Every listable type carries its like counter and the viewer's liked flag,
//! and knows its sort-column values so the pager can derive cursors from it.

use serde::{Deserialize, Serialize};

use crate::cache::SortField;
use crate::engagement::Likeable;
use crate::feed::FeedItem;

/// Summary of an article for feed views
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleSummary {
  pub id: String,
  pub title: String,
  pub author: String,
  pub created_at: String,
  #[serde(default)]
  pub tags: Vec<String>,
  #[serde(default)]
  pub like_count: u64,
  #[serde(default)]
  pub viewer_has_liked: bool,
}

/// Summary of a portfolio project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSummary {
  pub id: String,
  pub title: String,
  pub owner: String,
  pub created_at: String,
  pub cover_image: Option<String>,
  #[serde(default)]
  pub like_count: u64,
  #[serde(default)]
  pub viewer_has_liked: bool,
}

/// Summary of a forum thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadSummary {
  pub id: String,
  pub title: String,
  pub author: String,
  pub created_at: String,
  /// Bumped whenever a reply lands; threads sort by activity with this
  pub updated_at: String,
  #[serde(default)]
  pub reply_count: u64,
  #[serde(default)]
  pub like_count: u64,
  #[serde(default)]
  pub viewer_has_liked: bool,
}

/// A reply within a thread
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply {
  pub id: String,
  pub thread_id: String,
  pub author: String,
  pub body: String,
  pub created_at: String,
  #[serde(default)]
  pub like_count: u64,
  #[serde(default)]
  pub viewer_has_liked: bool,
}

/// A comment under an article or project
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
  pub id: String,
  pub parent_id: String,
  pub author: String,
  pub body: String,
  pub created_at: String,
  #[serde(default)]
  pub like_count: u64,
  #[serde(default)]
  pub viewer_has_liked: bool,
}

impl FeedItem for ArticleSummary {
  fn id(&self) -> &str {
    &self.id
  }

  fn sort_value(&self, field: SortField) -> String {
    match field {
      SortField::Title => self.title.clone(),
      SortField::LikeCount => self.like_count.to_string(),
      // Articles are immutable once published
      SortField::CreatedAt | SortField::UpdatedAt => self.created_at.clone(),
    }
  }
}

impl FeedItem for ProjectSummary {
  fn id(&self) -> &str {
    &self.id
  }

  fn sort_value(&self, field: SortField) -> String {
    match field {
      SortField::Title => self.title.clone(),
      SortField::LikeCount => self.like_count.to_string(),
      SortField::CreatedAt | SortField::UpdatedAt => self.created_at.clone(),
    }
  }
}

impl FeedItem for ThreadSummary {
  fn id(&self) -> &str {
    &self.id
  }

  fn sort_value(&self, field: SortField) -> String {
    match field {
      SortField::Title => self.title.clone(),
      SortField::LikeCount => self.like_count.to_string(),
      SortField::CreatedAt => self.created_at.clone(),
      SortField::UpdatedAt => self.updated_at.clone(),
    }
  }
}

impl FeedItem for Reply {
  fn id(&self) -> &str {
    &self.id
  }

  fn sort_value(&self, field: SortField) -> String {
    match field {
      SortField::LikeCount => self.like_count.to_string(),
      // Replies have no title; time is the only other meaningful order
      _ => self.created_at.clone(),
    }
  }
}

impl FeedItem for Comment {
  fn id(&self) -> &str {
    &self.id
  }

  fn sort_value(&self, field: SortField) -> String {
    match field {
      SortField::LikeCount => self.like_count.to_string(),
      _ => self.created_at.clone(),
    }
  }
}

impl Likeable for ArticleSummary {
  fn entity_id(&self) -> &str {
    &self.id
  }

  fn like_count(&self) -> u64 {
    self.like_count
  }

  fn viewer_has_liked(&self) -> bool {
    self.viewer_has_liked
  }
}

impl Likeable for ProjectSummary {
  fn entity_id(&self) -> &str {
    &self.id
  }

  fn like_count(&self) -> u64 {
    self.like_count
  }

  fn viewer_has_liked(&self) -> bool {
    self.viewer_has_liked
  }
}

impl Likeable for ThreadSummary {
  fn entity_id(&self) -> &str {
    &self.id
  }

  fn like_count(&self) -> u64 {
    self.like_count
  }

  fn viewer_has_liked(&self) -> bool {
    self.viewer_has_liked
  }
}

impl Likeable for Reply {
  fn entity_id(&self) -> &str {
    &self.id
  }

  fn like_count(&self) -> u64 {
    self.like_count
  }

  fn viewer_has_liked(&self) -> bool {
    self.viewer_has_liked
  }
}

impl Likeable for Comment {
  fn entity_id(&self) -> &str {
    &self.id
  }

  fn like_count(&self) -> u64 {
    self.like_count
  }

  fn viewer_has_liked(&self) -> bool {
    self.viewer_has_liked
  }
}
