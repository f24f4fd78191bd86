//! Toggle flow driver: optimistic apply, background mutation, poll-based
//! completion handling.

use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::mpsc;

use super::reconciler::{DeltaReconciler, Direction};
use super::Likeable;
use crate::error::ApiError;

type ToggleFuture = BoxFuture<'static, Result<bool, ApiError>>;
type ToggleFn = Box<dyn Fn(String) -> ToggleFuture + Send + Sync>;

/// What happened when a toggle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
  /// Optimistic state applied, mutation in flight.
  Started,
  /// A mutation for this entity is already in flight; the request was
  /// rejected rather than queued.
  AlreadyPending,
}

/// Completion events surfaced by [`LikeController::poll`] for the embedding
/// view to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LikeEvent {
  /// The backend confirmed the toggle. The delta stays in place until the
  /// next authoritative refresh delivers the updated count.
  Confirmed { entity_id: String, liked: bool },
  /// The mutation failed and the optimistic state was reverted. Shown as a
  /// non-blocking notification; the user re-invokes the action if they still
  /// want it.
  RolledBack { entity_id: String, message: String },
}

/// A finished mutation crossing back from its task.
#[derive(Debug)]
struct Completion {
  entity_id: String,
  direction: Direction,
  outcome: Result<bool, String>,
}

/// Drives like toggles for one visible list.
///
/// `toggle` applies the optimistic flip and delta synchronously, marks the
/// entity pending and spawns the mutation; the result comes back over an
/// unbounded channel and is applied by `poll` on the caller's event loop —
/// nothing here ever blocks that loop. A hung call simply leaves its entity
/// pending, keeping its action control disabled.
pub struct LikeController {
  reconciler: DeltaReconciler,
  /// Local mirror of "does the viewer like this entity".
  liked: HashMap<String, bool>,
  toggler: ToggleFn,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl LikeController {
  /// Create a controller around a toggle mutation: a closure receiving the
  /// entity id and resolving to the backend's resulting liked state.
  pub fn new<F, Fut>(toggler: F) -> Self
  where
    F: Fn(String) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, ApiError>> + Send + 'static,
  {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      reconciler: DeltaReconciler::new(),
      liked: HashMap::new(),
      toggler: Box::new(move |entity_id| Box::pin(toggler(entity_id))),
      tx,
      rx,
    }
  }

  /// Toggle the viewer's like on an entity.
  ///
  /// Rejects the call if a toggle for the same entity is still in flight;
  /// whether to queue or drop an overlapping toggle is a product decision and
  /// dropping is the one that can't double-count.
  pub fn toggle(&mut self, entity_id: &str) -> ToggleOutcome {
    if !self.reconciler.mark_pending(entity_id) {
      return ToggleOutcome::AlreadyPending;
    }

    let now_liked = !self.is_liked(entity_id);
    self.liked.insert(entity_id.to_string(), now_liked);
    let direction = if now_liked {
      Direction::Up
    } else {
      Direction::Down
    };
    // Delta lands before the network call begins
    self.reconciler.apply_optimistic(entity_id, direction);

    let future = (self.toggler)(entity_id.to_string());
    let tx = self.tx.clone();
    let entity_id = entity_id.to_string();
    tokio::spawn(async move {
      let outcome = future.await.map_err(|e| e.to_string());
      // Receiver dropped means the view is gone; nothing left to reconcile
      let _ = tx.send(Completion {
        entity_id,
        direction,
        outcome,
      });
    });

    ToggleOutcome::Started
  }

  /// Drain finished mutations and fold them in. Call from the event loop
  /// tick; returns the events the view should surface.
  pub fn poll(&mut self) -> Vec<LikeEvent> {
    let mut events = Vec::new();
    while let Ok(done) = self.rx.try_recv() {
      // Cleared on both paths so a settled mutation never blocks future
      // reconciliation for its entity
      self.reconciler.clear_pending(&done.entity_id);
      match done.outcome {
        Ok(liked) => {
          // Converge on the backend's view; toggles are idempotent-by-intent
          // so this only differs when another session raced us
          self.liked.insert(done.entity_id.clone(), liked);
          events.push(LikeEvent::Confirmed {
            entity_id: done.entity_id,
            liked,
          });
        }
        Err(message) => {
          self.reconciler.rollback(&done.entity_id, done.direction);
          let reverted = done.direction == Direction::Down;
          self.liked.insert(done.entity_id.clone(), reverted);
          tracing::warn!(entity_id = %done.entity_id, %message, "like toggle failed, rolled back");
          events.push(LikeEvent::RolledBack {
            entity_id: done.entity_id,
            message,
          });
        }
      }
    }
    events
  }

  /// Fold a refreshed authoritative page (from a list refetch or a
  /// change-feed refresh): update the liked mirror for settled entities and
  /// retire their deltas. Safe to call repeatedly — the change feed is
  /// at-least-once and reconciliation is idempotent.
  pub fn apply_refresh<T: Likeable>(&mut self, rows: &[T]) {
    for row in rows {
      if !self.reconciler.is_pending(row.entity_id()) {
        self
          .liked
          .insert(row.entity_id().to_string(), row.viewer_has_liked());
      }
    }
    self.reconciler.reconcile(rows.iter().map(|r| r.entity_id()));
  }

  /// The count to render for a refreshed row.
  pub fn displayed_count_for<T: Likeable>(&self, row: &T) -> u64 {
    self
      .reconciler
      .displayed_count(row.entity_id(), row.like_count())
  }

  /// The count to render given an authoritative value.
  pub fn displayed_count(&self, entity_id: &str, authoritative: u64) -> u64 {
    self.reconciler.displayed_count(entity_id, authoritative)
  }

  /// Whether the viewer currently likes the entity, optimistic flips
  /// included.
  pub fn is_liked(&self, entity_id: &str) -> bool {
    self.liked.get(entity_id).copied().unwrap_or(false)
  }

  /// Whether a mutation is in flight for the entity (views disable the
  /// action control while true).
  pub fn is_pending(&self, entity_id: &str) -> bool {
    self.reconciler.is_pending(entity_id)
  }

  #[cfg(test)]
  pub(crate) fn reconciler(&self) -> &DeltaReconciler {
    &self.reconciler
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::realtime::{ChannelFeed, ScopeWatcher};
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Arc;
  use std::time::Duration;

  #[derive(Clone)]
  struct FakeRow {
    id: String,
    like_count: u64,
    viewer_has_liked: bool,
  }

  impl Likeable for FakeRow {
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

  fn row(id: &str, like_count: u64, liked: bool) -> FakeRow {
    FakeRow {
      id: id.to_string(),
      like_count,
      viewer_has_liked: liked,
    }
  }

  async fn settle(controller: &mut LikeController) -> Vec<LikeEvent> {
    tokio::time::sleep(Duration::from_millis(10)).await;
    controller.poll()
  }

  #[tokio::test]
  async fn test_successful_toggle_keeps_delta_until_refresh() {
    let mut controller = LikeController::new(|_id| async { Ok(true) });

    assert_eq!(controller.toggle("a"), ToggleOutcome::Started);
    // Optimistic state is visible before the mutation settles
    assert!(controller.is_liked("a"));
    assert!(controller.is_pending("a"));
    assert_eq!(controller.displayed_count("a", 5), 6);

    let events = settle(&mut controller).await;
    assert_eq!(
      events,
      vec![LikeEvent::Confirmed {
        entity_id: "a".to_string(),
        liked: true
      }]
    );
    assert!(!controller.is_pending("a"));
    // Still adjusting the stale authoritative value
    assert_eq!(controller.displayed_count("a", 5), 6);

    // The refresh delivers the updated count; the delta folds away
    let fresh = vec![row("a", 6, true)];
    controller.apply_refresh(&fresh);
    assert_eq!(controller.displayed_count_for(&fresh[0]), 6);
    assert!(!controller.reconciler().has_delta("a"));
  }

  #[tokio::test]
  async fn test_failed_toggle_rolls_back() {
    let mut controller = LikeController::new(|_id| async {
      Err(ApiError::Status {
        status: 503,
        message: "backend unavailable".to_string(),
      })
    });

    controller.toggle("a");
    assert!(controller.is_liked("a"));
    assert_eq!(controller.displayed_count("a", 5), 6);

    let events = settle(&mut controller).await;
    assert!(matches!(
      events.as_slice(),
      [LikeEvent::RolledBack { entity_id, .. }] if entity_id == "a"
    ));
    assert!(!controller.is_liked("a"));
    assert!(!controller.is_pending("a"));
    assert_eq!(controller.displayed_count("a", 5), 5);
    assert!(!controller.reconciler().has_delta("a"));
  }

  #[tokio::test]
  async fn test_unlike_decrements() {
    let mut controller = LikeController::new(|_id| async { Ok(false) });
    controller.apply_refresh(&[row("a", 5, true)]);

    controller.toggle("a");
    assert!(!controller.is_liked("a"));
    assert_eq!(controller.displayed_count("a", 5), 4);

    settle(&mut controller).await;
    assert_eq!(controller.displayed_count("a", 5), 4);
  }

  #[tokio::test]
  async fn test_overlapping_toggle_on_same_entity_is_rejected() {
    let mut controller = LikeController::new(|_id| async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok(true)
    });

    assert_eq!(controller.toggle("a"), ToggleOutcome::Started);
    assert_eq!(controller.toggle("a"), ToggleOutcome::AlreadyPending);
    // The rejected call changed nothing
    assert_eq!(controller.reconciler().delta("a"), 1);
    assert!(controller.is_liked("a"));

    // Toggles on other entities proceed independently
    assert_eq!(controller.toggle("b"), ToggleOutcome::Started);
  }

  #[tokio::test]
  async fn test_refresh_during_pending_mutation_keeps_delta() {
    // The core correctness property: an authoritative refetch landing inside
    // the window between the pending mark and the mutation's completion must
    // not erase the in-flight delta.
    let mut controller = LikeController::new(|_id| async {
      tokio::time::sleep(Duration::from_millis(50)).await;
      Ok(true)
    });
    controller.apply_refresh(&[row("a", 5, false), row("b", 3, false)]);

    controller.toggle("a");
    assert_eq!(controller.displayed_count("a", 5), 6);

    // Refetch completes while the toggle is still in flight, serving the old
    // count for "a" (the backend hasn't seen the like yet)
    controller.apply_refresh(&[row("a", 5, false), row("b", 3, false)]);
    assert_eq!(controller.displayed_count("a", 5), 6);
    assert!(controller.is_liked("a"), "refresh must not revert a pending flip");

    tokio::time::sleep(Duration::from_millis(60)).await;
    controller.poll();

    // Next refresh carries the confirmed count and retires the delta
    controller.apply_refresh(&[row("a", 6, true), row("b", 3, false)]);
    assert_eq!(controller.displayed_count("a", 6), 6);
    assert!(!controller.reconciler().has_delta("a"));
  }

  #[tokio::test]
  async fn test_change_feed_loop_reconciles() {
    // Full loop: change feed fires, consumer refetches the scope, refreshed
    // rows fold into the controller.
    let feed = ChannelFeed::new();
    let mut watcher = ScopeWatcher::new(&feed, "article_42");
    let fetches = Arc::new(AtomicUsize::new(0));

    let mut controller = LikeController::new(|_id| async { Ok(true) });
    controller.apply_refresh(&[row("c1", 0, false)]);
    controller.toggle("c1");
    settle(&mut controller).await;

    // Another client's change and our own confirmation both push events;
    // at-least-once delivery collapses into a single refetch
    feed.publish("article_42");
    feed.publish("article_42");

    if watcher.take_dirty() {
      fetches.fetch_add(1, Ordering::SeqCst);
      controller.apply_refresh(&[row("c1", 1, true)]);
    }

    assert_eq!(fetches.load(Ordering::SeqCst), 1);
    assert!(!watcher.take_dirty());
    assert_eq!(controller.displayed_count("c1", 1), 1);
    assert!(!controller.reconciler().has_delta("c1"));
  }
}
