//! Serde-deserializable types matching Agora API responses.
//!
//! Wire envelopes stay separate from domain types to allow clean
//! deserialization while keeping domain types focused on what views need.

use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Re-serialize a value through JSON to convert between compatible shapes.
/// Used to lift raw feed rows into typed view models.
pub fn reserialize<T: DeserializeOwned>(value: impl Serialize) -> serde_json::Result<T> {
  serde_json::from_value(serde_json::to_value(value)?)
}

/// Row-list endpoints respond with the rows as raw JSON objects; typing
/// happens client-side per resource.
#[derive(Debug, Deserialize)]
pub struct ApiRowsResponse {
  #[serde(default)]
  pub rows: Vec<serde_json::Value>,
}

/// Response of the like-toggle endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiToggleResponse {
  pub liked: bool,
  /// Authoritative count after the toggle. Informational only: the displayed
  /// count keeps its optimistic delta until the next full refresh.
  #[serde(default)]
  pub like_count: u64,
}

/// Error body the backend attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub code: String,
  #[serde(default)]
  pub message: String,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_rows_default_when_missing() {
    let body: ApiRowsResponse = serde_json::from_str("{}").unwrap();
    assert!(body.rows.is_empty());
  }

  #[test]
  fn test_reserialize_lifts_row() {
    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
      id: String,
    }

    let raw = serde_json::json!({ "id": "a1", "extra": 42 });
    let row: Row = reserialize(raw).unwrap();
    assert_eq!(row.id, "a1");
  }
}
