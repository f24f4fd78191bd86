//! Short-TTL in-memory cache with per-resource invalidation.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use super::key::{FeedKey, Resource};

/// A cached value with its expiry instant.
#[derive(Debug, Clone)]
struct CacheEntry<V> {
  value: V,
  expires_at: DateTime<Utc>,
}

/// A TTL key-value map guarded by a mutex.
///
/// Expiry is lazy: an expired entry is treated as a miss on `get` and simply
/// stays in place until the next `set` overwrites it or an invalidation
/// removes it. There is no background sweeper; entry counts here are small
/// (one per visible first page).
pub struct TtlCache<K, V> {
  entries: Mutex<HashMap<K, CacheEntry<V>>>,
  ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
  /// Create a cache whose entries stay fresh for `ttl`.
  pub fn new(ttl: Duration) -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
      ttl,
    }
  }

  /// Look up a value. Expired entries are misses.
  pub fn get(&self, key: &K) -> Option<V> {
    let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    let entry = entries.get(key)?;
    if Utc::now() < entry.expires_at {
      Some(entry.value.clone())
    } else {
      None
    }
  }

  /// Store a value with the default TTL, unconditionally overwriting.
  pub fn set(&self, key: K, value: V) {
    self.set_with_ttl(key, value, self.ttl);
  }

  /// Store a value with an explicit TTL.
  pub fn set_with_ttl(&self, key: K, value: V, ttl: Duration) {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.insert(
      key,
      CacheEntry {
        value,
        expires_at: Utc::now() + ttl,
      },
    );
  }

  /// Remove every entry whose key matches the predicate.
  pub fn invalidate_matching(&self, pred: impl Fn(&K) -> bool) {
    let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
    entries.retain(|key, _| !pred(key));
  }

  /// Number of entries currently held, expired ones included.
  pub fn len(&self) -> usize {
    self
      .entries
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// The shared feed cache: first pages keyed by [`FeedKey`], stored as the raw
/// JSON rows the backend returned so one cache serves every row type.
pub type FeedCache = TtlCache<FeedKey, Vec<serde_json::Value>>;

impl TtlCache<FeedKey, Vec<serde_json::Value>> {
  /// Drop every cached first page for one resource.
  ///
  /// Called after any create/update/delete that could change a first-page
  /// query result, so the next read goes back to the authoritative source.
  /// Coarse but cheap, and correct by construction: only first pages are
  /// cached, so stale data can survive at most one TTL window.
  pub fn invalidate_resource(&self, resource: Resource) {
    tracing::debug!(resource = %resource, "invalidating cached first pages");
    self.invalidate_matching(|key| key.resource == resource);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::key::{SortDirection, SortField};

  fn key(resource: Resource) -> FeedKey {
    FeedKey {
      resource,
      sort_field: SortField::CreatedAt,
      direction: SortDirection::Desc,
      page_size: 10,
    }
  }

  #[test]
  fn test_get_within_ttl_hits() {
    let cache: TtlCache<&str, i32> = TtlCache::new(Duration::seconds(1));
    cache.set("a", 1);
    assert_eq!(cache.get(&"a"), Some(1));
  }

  #[test]
  fn test_expired_entry_is_a_miss() {
    let cache: TtlCache<&str, i32> = TtlCache::new(Duration::seconds(60));
    cache.set_with_ttl("a", 1, Duration::milliseconds(-1));
    assert_eq!(cache.get(&"a"), None);
    // Lazy expiry: the entry is not swept, just ignored
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_expiry_after_real_time_passes() {
    let cache: TtlCache<&str, i32> = TtlCache::new(Duration::milliseconds(20));
    cache.set("a", 1);
    assert_eq!(cache.get(&"a"), Some(1));
    std::thread::sleep(std::time::Duration::from_millis(40));
    assert_eq!(cache.get(&"a"), None);
  }

  #[test]
  fn test_set_overwrites_unconditionally() {
    let cache: TtlCache<&str, i32> = TtlCache::new(Duration::seconds(60));
    cache.set("a", 1);
    cache.set("a", 2);
    assert_eq!(cache.get(&"a"), Some(2));
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_invalidate_resource_leaves_others_alone() {
    let cache = FeedCache::new(Duration::seconds(120));
    let page_a = vec![serde_json::json!({"id": "a1"})];
    let page_p = vec![serde_json::json!({"id": "p1"})];
    cache.set(key(Resource::Articles), page_a);
    cache.set(key(Resource::Projects), page_p.clone());

    cache.invalidate_resource(Resource::Articles);

    assert_eq!(cache.get(&key(Resource::Articles)), None);
    assert_eq!(cache.get(&key(Resource::Projects)), Some(page_p));
  }
}
