use std::collections::HashSet;

/// Registry of entity ids with an outstanding asynchronous mutation.
///
/// An id is marked before its network call starts and cleared on both the
/// success and failure paths, so a completed mutation can never leave an
/// entity blocked from future reconciliation.
#[derive(Debug, Default)]
pub struct PendingOps {
  ids: HashSet<String>,
}

impl PendingOps {
  pub fn new() -> Self {
    Self::default()
  }

  /// Mark an id pending. Returns false if it already was, which callers use
  /// as the in-flight guard against overlapping toggles on one entity.
  pub fn mark(&mut self, entity_id: &str) -> bool {
    self.ids.insert(entity_id.to_string())
  }

  pub fn clear(&mut self, entity_id: &str) {
    self.ids.remove(entity_id);
  }

  pub fn contains(&self, entity_id: &str) -> bool {
    self.ids.contains(entity_id)
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_mark_is_idempotent_and_reports_duplicates() {
    let mut pending = PendingOps::new();
    assert!(pending.mark("a"));
    assert!(!pending.mark("a"));
    assert_eq!(pending.len(), 1);
  }

  #[test]
  fn test_clear_allows_remarking() {
    let mut pending = PendingOps::new();
    pending.mark("a");
    pending.clear("a");
    assert!(!pending.contains("a"));
    assert!(pending.mark("a"));
  }
}
