use tokio::sync::mpsc;

use super::{ChangeFeed, Subscription};

/// Bridges a scope subscription to a poll-style event loop.
///
/// Feed callbacks fire on the transport's schedule; the watcher buffers them
/// in an unbounded channel so the consumer reads them on its own tick, the
/// same way mutation completions are handled.
pub struct ScopeWatcher {
  rx: mpsc::UnboundedReceiver<()>,
  _subscription: Subscription,
}

impl ScopeWatcher {
  pub fn new(feed: &dyn ChangeFeed, scope: &str) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscription = feed.subscribe(
      scope,
      Box::new(move || {
        // Receiver gone means the watcher was dropped; nothing to notify
        let _ = tx.send(());
      }),
    );
    Self {
      rx,
      _subscription: subscription,
    }
  }

  /// Drain buffered notifications; true if at least one arrived since the
  /// last call. Duplicate at-least-once deliveries collapse into one refetch.
  pub fn take_dirty(&mut self) -> bool {
    let mut dirty = false;
    while self.rx.try_recv().is_ok() {
      dirty = true;
    }
    dirty
  }

  /// Await the next change notification. Returns false if the feed side was
  /// torn down.
  pub async fn changed(&mut self) -> bool {
    self.rx.recv().await.is_some()
  }
}
