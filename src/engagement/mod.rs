//! Optimistic engagement counters and their reconciliation.
//!
//! A user's like lands on screen immediately as a signed delta on top of the
//! last authoritative count, while the mutation runs in the background. The
//! authoritative value arrives later through a list refetch or a change-feed
//! refresh, at which point the delta is folded away — unless the mutation is
//! still in flight, in which case the delta must survive the pass.

mod controller;
mod pending;
mod reconciler;

pub use controller::{LikeController, LikeEvent, ToggleOutcome};
pub use pending::PendingOps;
pub use reconciler::{DeltaReconciler, Direction};

/// Anything carrying a like counter and the viewer's liked flag.
///
/// Implemented by every feed row type so refreshed pages can be folded into a
/// [`LikeController`] directly.
pub trait Likeable {
  fn entity_id(&self) -> &str;
  fn like_count(&self) -> u64;
  fn viewer_has_liked(&self) -> bool;
}
