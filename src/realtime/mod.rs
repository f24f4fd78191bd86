//! Change-feed contract: coarse per-scope invalidation pushes.
//!
//! The backend pushes "something changed under this parent" with no
//! change-level detail; the only correct reaction is to refetch the full
//! authoritative set for the scope. Delivery is at-least-once — consumers
//! collapse duplicates and reconciliation is idempotent, so redundant events
//! cost a refetch, never correctness.
//!
//! The transport itself (websocket, SSE, ...) lives outside this crate; what
//! lives here is the contract plus an in-process implementation for tests and
//! embedders whose transport already delivers into the process.

mod channel;
mod watcher;

pub use channel::ChannelFeed;
pub use watcher::ScopeWatcher;

/// Callback invoked on every change event for a subscribed scope.
pub type ChangeCallback = Box<dyn Fn() + Send + Sync>;

/// A push channel keyed by parent scope (e.g. "all changes under article X").
pub trait ChangeFeed {
  /// Subscribe to every change under `scope`. The callback carries no detail
  /// about what changed.
  fn subscribe(&self, scope: &str, on_change: ChangeCallback) -> Subscription;
}

/// Active subscription handle; unsubscribes when dropped.
pub struct Subscription {
  cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
  pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
    Self {
      cancel: Some(Box::new(cancel)),
    }
  }
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(cancel) = self.cancel.take() {
      cancel();
    }
  }
}

impl std::fmt::Debug for Subscription {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Subscription")
      .field("active", &self.cancel.is_some())
      .finish()
  }
}
