use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use super::{ChangeCallback, ChangeFeed, Subscription};

type Registry = Arc<Mutex<HashMap<String, Vec<(u64, ChangeCallback)>>>>;

/// In-process change feed: scopes fan out to registered callbacks.
///
/// Transports that already deliver events into the process (or tests) publish
/// into this; everything downstream sees only the [`ChangeFeed`] contract.
#[derive(Clone, Default)]
pub struct ChannelFeed {
  subscribers: Registry,
  next_id: Arc<AtomicU64>,
}

impl ChannelFeed {
  pub fn new() -> Self {
    Self::default()
  }

  /// Deliver a change event to every subscriber of `scope`.
  pub fn publish(&self, scope: &str) {
    let subscribers = self
      .subscribers
      .lock()
      .unwrap_or_else(PoisonError::into_inner);
    if let Some(callbacks) = subscribers.get(scope) {
      tracing::debug!(scope, count = callbacks.len(), "publishing change event");
      for (_, on_change) in callbacks {
        on_change();
      }
    }
  }
}

impl ChangeFeed for ChannelFeed {
  fn subscribe(&self, scope: &str, on_change: ChangeCallback) -> Subscription {
    let id = self.next_id.fetch_add(1, Ordering::Relaxed);
    self
      .subscribers
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .entry(scope.to_string())
      .or_default()
      .push((id, on_change));

    let subscribers = Arc::clone(&self.subscribers);
    let scope = scope.to_string();
    Subscription::new(move || {
      let mut subs = subscribers.lock().unwrap_or_else(PoisonError::into_inner);
      if let Some(callbacks) = subs.get_mut(&scope) {
        callbacks.retain(|(sub_id, _)| *sub_id != id);
      }
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::AtomicUsize;

  fn counting_callback() -> (Arc<AtomicUsize>, ChangeCallback) {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    let callback: ChangeCallback = Box::new(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    });
    (count, callback)
  }

  #[test]
  fn test_publish_reaches_scope_subscribers_only() {
    let feed = ChannelFeed::new();
    let (article_count, article_cb) = counting_callback();
    let (thread_count, thread_cb) = counting_callback();
    let _a = feed.subscribe("article_1", article_cb);
    let _t = feed.subscribe("thread_9", thread_cb);

    feed.publish("article_1");
    feed.publish("article_1");

    assert_eq!(article_count.load(Ordering::SeqCst), 2);
    assert_eq!(thread_count.load(Ordering::SeqCst), 0);
  }

  #[test]
  fn test_dropping_subscription_unsubscribes() {
    let feed = ChannelFeed::new();
    let (count, callback) = counting_callback();
    let subscription = feed.subscribe("article_1", callback);

    feed.publish("article_1");
    drop(subscription);
    feed.publish("article_1");

    assert_eq!(count.load(Ordering::SeqCst), 1);
  }
}
