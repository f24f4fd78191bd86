use std::collections::HashMap;

use super::pending::PendingOps;

/// Which way a toggle moves the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
  Up,
  Down,
}

impl Direction {
  pub fn signum(self) -> i64 {
    match self {
      Direction::Up => 1,
      Direction::Down => -1,
    }
  }
}

/// Per-entity signed adjustments on top of the last authoritative counts.
///
/// One reconciler per visible list: state lives on the instance so two lists
/// showing overlapping entities can't cross-contaminate each other's deltas.
///
/// An entry's presence means the displayed count differs from the last
/// authoritative value the client observed. Entries are removed outright once
/// reconciled, never zeroed in place.
#[derive(Debug, Default)]
pub struct DeltaReconciler {
  deltas: HashMap<String, i64>,
  pending: PendingOps,
}

impl DeltaReconciler {
  pub fn new() -> Self {
    Self::default()
  }

  /// Apply a user action's adjustment. Must run synchronously with the input,
  /// before the mutation's network call starts.
  pub fn apply_optimistic(&mut self, entity_id: &str, direction: Direction) {
    self.adjust(entity_id, direction.signum());
  }

  /// Undo a failed mutation's adjustment. Paired subtraction with the same
  /// direction the mutation applied, not a blind reset: rapid toggles on
  /// different entities may have interleaved in the meantime.
  pub fn rollback(&mut self, entity_id: &str, direction: Direction) {
    self.adjust(entity_id, -direction.signum());
  }

  fn adjust(&mut self, entity_id: &str, amount: i64) {
    let delta = self.deltas.entry(entity_id.to_string()).or_insert(0);
    *delta += amount;
    if *delta == 0 {
      self.deltas.remove(entity_id);
    }
  }

  /// Fold refreshed authoritative rows: drop the delta of every refreshed id
  /// that has no mutation in flight — the value the caller is about to render
  /// already includes it. Pending ids always survive the pass; their mutation
  /// must complete or fail before the delta is final.
  pub fn reconcile<'a, I>(&mut self, fresh_ids: I)
  where
    I: IntoIterator<Item = &'a str>,
  {
    for id in fresh_ids {
      if !self.pending.contains(id) {
        self.deltas.remove(id);
      }
    }
  }

  /// The count to render: authoritative plus delta, clamped at zero. A
  /// negative sum can only occur transiently during a rollback race and must
  /// never reach the screen.
  pub fn displayed_count(&self, entity_id: &str, authoritative: u64) -> u64 {
    let delta = self.delta(entity_id);
    (authoritative as i64 + delta).max(0) as u64
  }

  pub fn delta(&self, entity_id: &str) -> i64 {
    self.deltas.get(entity_id).copied().unwrap_or(0)
  }

  pub fn has_delta(&self, entity_id: &str) -> bool {
    self.deltas.contains_key(entity_id)
  }

  /// Mark an id pending before its network call. Returns false if a mutation
  /// is already in flight for it.
  pub fn mark_pending(&mut self, entity_id: &str) -> bool {
    self.pending.mark(entity_id)
  }

  /// Clear the pending mark; called on both completion paths.
  pub fn clear_pending(&mut self, entity_id: &str) {
    self.pending.clear(entity_id);
  }

  pub fn is_pending(&self, entity_id: &str) -> bool {
    self.pending.contains(entity_id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_displayed_count_never_negative() {
    let mut reconciler = DeltaReconciler::new();
    // Adversarial pile-up of rollbacks without matching applies
    for _ in 0..5 {
      reconciler.rollback("a", Direction::Up);
    }
    assert_eq!(reconciler.delta("a"), -5);
    assert_eq!(reconciler.displayed_count("a", 2), 0);
    assert_eq!(reconciler.displayed_count("a", 100), 95);
    assert_eq!(reconciler.displayed_count("missing", 0), 0);
  }

  #[test]
  fn test_apply_then_rollback_removes_entry() {
    let mut reconciler = DeltaReconciler::new();
    reconciler.apply_optimistic("a", Direction::Up);
    assert_eq!(reconciler.delta("a"), 1);
    reconciler.rollback("a", Direction::Up);
    assert_eq!(reconciler.delta("a"), 0);
    assert!(!reconciler.has_delta("a"));

    // Same round trip while pending
    reconciler.mark_pending("a");
    reconciler.apply_optimistic("a", Direction::Down);
    reconciler.rollback("a", Direction::Down);
    assert!(!reconciler.has_delta("a"));
  }

  #[test]
  fn test_pending_delta_survives_reconcile() {
    let mut reconciler = DeltaReconciler::new();
    reconciler.mark_pending("a");
    reconciler.apply_optimistic("a", Direction::Up);
    reconciler.apply_optimistic("b", Direction::Up);

    reconciler.reconcile(["a", "b"]);

    assert_eq!(reconciler.delta("a"), 1);
    assert!(!reconciler.has_delta("b"));

    // Once the mutation settles, the next refresh folds the delta away
    reconciler.clear_pending("a");
    reconciler.reconcile(["a", "b"]);
    assert!(!reconciler.has_delta("a"));
  }

  #[test]
  fn test_reconcile_only_touches_refreshed_ids() {
    let mut reconciler = DeltaReconciler::new();
    reconciler.apply_optimistic("a", Direction::Up);
    reconciler.apply_optimistic("b", Direction::Down);

    reconciler.reconcile(["a"]);

    assert!(!reconciler.has_delta("a"));
    assert_eq!(reconciler.delta("b"), -1);
  }

  #[test]
  fn test_interleaved_toggles_accumulate() {
    let mut reconciler = DeltaReconciler::new();
    reconciler.apply_optimistic("a", Direction::Up);
    reconciler.apply_optimistic("a", Direction::Up);
    assert_eq!(reconciler.delta("a"), 2);
    reconciler.rollback("a", Direction::Up);
    assert_eq!(reconciler.delta("a"), 1);
    assert_eq!(reconciler.displayed_count("a", 10), 11);
  }
}
